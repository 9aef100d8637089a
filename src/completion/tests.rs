use super::*;

#[test]
fn misconfiguration_is_credential_related() {
    assert!(CompletionError::MissingCredential.is_misconfiguration());
    assert!(CompletionError::Unauthorized(403).is_misconfiguration());

    assert!(!CompletionError::Status(500).is_misconfiguration());
    assert!(!CompletionError::Timeout.is_misconfiguration());
    assert!(!CompletionError::Network("reset".to_string()).is_misconfiguration());
    assert!(!CompletionError::Malformed("eof".to_string()).is_misconfiguration());
}

#[test]
fn system_prompt_embeds_context() {
    let prompt = system_prompt("Advanced Track (9 months)");

    assert!(prompt.starts_with("You are an AI assistant for Atomcamp"));
    assert!(prompt.contains("Context: Advanced Track (9 months)"));
    assert!(prompt.contains("Do not use emojis"));
}
