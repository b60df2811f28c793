use crate::traits::TextGenerator;
use dashboard_core::DashboardResult;
use dashboard_domain::AppDescription;

/// Ask the model for short and long store copy for an app.
pub async fn generate_description(
    generator: &dyn TextGenerator,
    app_name: &str,
    app_details: &str,
) -> DashboardResult<AppDescription> {
    let prompt = AppDescription::prompt(app_name, app_details)?;
    let text = generator.generate(&prompt).await.map_err(|e| {
        tracing::error!("Description generation failed: {}", e);
        e
    })?;
    AppDescription::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashboard_core::DashboardError;

    mockall::mock! {
        pub Generator {}

        #[async_trait]
        impl TextGenerator for Generator {
            async fn generate(&self, prompt: &str) -> DashboardResult<String>;
        }
    }

    #[tokio::test]
    async fn test_generates_and_parses() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|prompt| prompt.contains("\"Sky Blocks\"") && prompt.contains("survival"))
            .times(1)
            .returning(|_| Ok("SHORT:\nFloat and build.\n\nLONG:\nA long story.".to_string()));

        let description = generate_description(&generator, "Sky Blocks", "survival on islands")
            .await
            .unwrap();
        assert_eq!(description.short, "Float and build.");
        assert_eq!(description.long, "A long story.");
    }

    #[tokio::test]
    async fn test_blank_inputs_never_reach_the_model() {
        let mut generator = MockGenerator::new();
        generator.expect_generate().never();

        let result = generate_description(&generator, " ", "details").await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
    }

    #[tokio::test]
    async fn test_response_without_long_part_is_rejected() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok("SHORT: only this".to_string()));

        let result = generate_description(&generator, "App", "details").await;
        assert!(matches!(result, Err(DashboardError::UpstreamResponse(_))));
    }
}
