use async_trait::async_trait;
use libris_kernel::{InitCtx, Module};

/// Reports how text generation is wired; the generator itself is stateless
pub struct GeneratorModule;

#[async_trait]
impl Module for GeneratorModule {
    fn name(&self) -> &'static str {
        "genai"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let assistant = &ctx.settings.assistant;
        if assistant.is_configured() {
            tracing::info!(
                module = self.name(),
                model = %assistant.model,
                timeout_ms = assistant.timeout_ms,
                "text generation enabled"
            );
        } else {
            tracing::warn!(
                module = self.name(),
                "no assistant api key configured; descriptions and chat will use fallbacks"
            );
        }
        Ok(())
    }
}
