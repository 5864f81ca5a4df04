use rd::environment::Environment;
use rd::pipeline::{self, TestSam};

#[tokio::test]
async fn every_environment_deploys_to_its_mapped_target() {
    let expected = [
        (Environment::Dev, "cfn-templates-v2-ap-south-1-dev", "ap-south-1"),
        (Environment::Qa, "cfn-templates-v2-ap-south-1-qa", "ap-south-1"),
        (Environment::Qa2, "cfn-templates-v2-ap-south-1-qa2", "ap-south-1"),
        (Environment::Uat, "cfn-templates-v2-ap-south-1-uat", "ap-south-1"),
        (Environment::Int, "cfn-templates-v2-int", "us-east-1"),
        (Environment::Int2, "cfn-templates-v2-ap-south-1-int2", "ap-south-1"),
        (
            Environment::Production,
            "cfn-oneaboveall-templates-production",
            "ap-south-1",
        ),
    ];

    for (env, bucket, region) in expected {
        let mut sam = TestSam::new();
        pipeline::run(&mut sam, env.target(), "deployer", pipeline::DEFAULT_TEMPLATE)
            .await
            .unwrap();

        assert_eq!(
            sam.invocations,
            vec![
                "build template.yaml".to_string(),
                format!("package {bucket} {region} deployer"),
                format!("deploy {bucket} {region} deployer {env}"),
            ],
            "wrong invocation sequence for {env}"
        );
    }
}

// single test owning the working directory, the others never touch it
#[tokio::test]
async fn packaged_template_is_removed_after_success_and_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let packaged = dir.path().join(pipeline::PACKAGED_TEMPLATE);

    std::fs::write(&packaged, "Resources: {}\n").unwrap();
    let mut sam = TestSam::new();
    pipeline::run(&mut sam, Environment::Dev.target(), "default", pipeline::DEFAULT_TEMPLATE)
        .await
        .unwrap();
    assert!(!packaged.exists(), "temp artifact left behind after success");

    std::fs::write(&packaged, "Resources: {}\n").unwrap();
    let mut sam = TestSam::new();
    sam.fail_on = Some(("deploy", 1));
    pipeline::run(&mut sam, Environment::Dev.target(), "default", pipeline::DEFAULT_TEMPLATE)
        .await
        .unwrap_err();
    assert!(!packaged.exists(), "temp artifact left behind after failure");
}
