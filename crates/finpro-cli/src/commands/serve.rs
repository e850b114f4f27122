//! Server command implementation

use anyhow::Result;
use finpro_server::ServerConfig;

use super::{build_service, ServiceOptions};

pub async fn cmd_serve(options: &ServiceOptions, host: &str, port: u16, no_auth: bool) -> Result<()> {
    println!("🚀 Starting FinPro web server...");
    println!("   Listening: http://{}:{}", host, port);

    let config = ServerConfig::from_env(!no_auth);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if config.api_keys.is_empty() {
        println!("   ❌ Authentication required but FINPRO_API_KEYS is not set");
        println!("      Set FINPRO_API_KEYS or use --no-auth for local development");
    } else {
        println!(
            "   🔑 API keys: {} configured (FINPRO_API_KEYS)",
            config.api_keys.len()
        );
    }
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (FINPRO_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }

    let service = build_service(options)?;
    if service.is_none() {
        println!("   💡 Tip: Set GEMINI_API_KEY to enable AI features");
    }

    println!();
    println!("   Press Ctrl+C to stop");

    finpro_server::serve(service, host, port, config).await
}
