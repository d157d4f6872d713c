use std::time::Duration;

use resumedb_core::config::LlmSettings;
use resumedb_core::traits::Generator;
use resumedb_rag::OllamaGenerator;

// Port 9 (discard) is closed on test hosts, so every request is refused.
const DEAD_URL: &str = "http://127.0.0.1:9";

#[test]
fn unreachable_backend_is_a_collaborator_error() {
    let generator = OllamaGenerator::new(DEAD_URL, "llama3.2", Duration::from_secs(2)).unwrap();
    let err = generator.generate("system", "prompt").unwrap_err();
    assert!(err.is_collaborator());
    assert!(!generator.is_available());
    assert!(generator.list_models().unwrap_err().is_collaborator());
}

#[test]
fn settings_select_the_model() {
    let settings = LlmSettings { base_url: format!("{DEAD_URL}/"), model: "mistral".into(), ..LlmSettings::default() };
    let generator = OllamaGenerator::from_settings(&settings).unwrap();
    assert_eq!(generator.model(), "mistral");
}
