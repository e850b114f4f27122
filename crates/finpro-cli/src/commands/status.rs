//! Status command implementation

use anyhow::Result;
use finpro_core::ai::AIBackend;
use finpro_core::model_router::TaskType;

use super::{load_prompts, load_router, select_client, ServiceOptions};

pub async fn cmd_status(options: &ServiceOptions) -> Result<()> {
    println!();
    println!("📊 FinPro Status");
    println!("   ─────────────────────────────────────────────────────────────");

    match select_client(options) {
        Some(ai) => {
            let info = ai.info();
            println!("   Backend: {}", info.backend);
            println!("   Host: {}", info.host);
            println!("   Model: {}", info.model);
            if ai.health_check().await {
                println!("   ✅ Backend reachable");
            } else {
                println!("   ⚠️  Backend configured but not responding");
            }
        }
        None => {
            println!("   ❌ No AI backend configured");
            println!("      Set GEMINI_API_KEY, or AI_BACKEND=ollama|openai_compatible|mock");
        }
    }

    let router = load_router(options)?;
    println!();
    println!(
        "   Model config: {}",
        router
            .config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(embedded default)".to_string())
    );
    for task in TaskType::all() {
        let config = router.config_for_task(*task);
        println!(
            "   - {:<9} model={} temperature={} timeout={}s retries={}",
            task.as_str(),
            config.model.as_deref().unwrap_or("(backend default)"),
            config
                .temperature
                .map(|t| t.to_string())
                .unwrap_or_else(|| "(default)".to_string()),
            config.timeout.as_secs(),
            config.max_retries
        );
    }

    let prompts = load_prompts(options)?;
    let overrides = prompts.list().iter().filter(|p| p.has_override).count();
    println!();
    println!("   Prompts: {} ({} overridden)", prompts.list().len(), overrides);

    println!();
    Ok(())
}
