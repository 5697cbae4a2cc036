use super::*;

#[test]
fn container_error_messages_are_descriptive() {
    let err = ContainerError::ImageNotFound("smartbugs/slither".into());
    assert_eq!(err.to_string(), "image not found: smartbugs/slither");
}

#[test]
fn container_spec_carries_labels() {
    let mut labels = HashMap::new();
    labels.insert("smartbugs".to_string(), "1".to_string());
    labels.insert("runid".to_string(), "run-1".to_string());
    let spec = ContainerSpec {
        image: "smartbugs/slither".into(),
        command: Some(vec!["slither".into(), "/sb/A.sol".into()]),
        entrypoint: None,
        workdir: PathBuf::from("/tmp/work"),
        cpu_quota: None,
        mem_limit: None,
        labels: labels.clone(),
    };
    assert_eq!(spec.labels.get("runid"), Some(&"run-1".to_string()));
}
