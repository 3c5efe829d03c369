use futures::future::join_all;
use serde_json::json;
use skillkit_foundation::skill::{
    MetaToolRequest, MetaToolResponse, ProgressiveSkillBuilder, SkillBuilder, SkillEvent,
    SkillManager, SkillMetaTool,
};
use skillkit_kernel::{
    ActionRequest, BoxError, LoadConfig, LoadLevel, ProgressiveSkill, Skill, SkillCategory,
    SkillContext, SkillError, SkillInstructions, SkillResources, Tool, ToolInput,
};
use skillkit_testing::{CountingLoader, LoadLog, MockTool};
use std::sync::Arc;

fn ctx() -> SkillContext {
    SkillContext::new("integration")
}

/// Register `id` with `deps`, recording lifecycle calls into `log`.
async fn register(manager: &SkillManager, log: &LoadLog, id: &str, deps: &[&str]) {
    let skill = SkillBuilder::new(id)
        .with_dependencies(deps.iter().copied())
        .with_hook(log.hook(id))
        .build()
        .unwrap();
    manager.register(skill).await.unwrap();
}

#[tokio::test]
async fn test_registry_error_taxonomy() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "a", &[]).await;

    let dup = SkillBuilder::new("a").build().unwrap();
    assert!(matches!(
        manager.register(dup).await,
        Err(SkillError::AlreadyRegistered(id)) if id == "a"
    ));
    assert!(matches!(
        manager.load(&ctx, "missing", &LoadConfig::default()).await,
        Err(SkillError::NotFound(_))
    ));
    assert!(matches!(
        manager.unload(&ctx, "a").await,
        Err(SkillError::NotLoaded(_))
    ));

    manager.load(&ctx, "a", &LoadConfig::default()).await.unwrap();
    assert!(matches!(
        manager.load(&ctx, "a", &LoadConfig::default()).await,
        Err(SkillError::AlreadyLoaded(_))
    ));
    assert_eq!(log.loads(), ["a"]);

    manager.unregister(&ctx, "a").await.unwrap();
    assert_eq!(log.unloads(), ["a"]);
    assert_eq!(manager.count().await, 0);
    assert_eq!(manager.loaded_count().await, 0);
}

#[tokio::test]
async fn test_advanced_loads_after_base() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "base", &[]).await;
    register(&manager, &log, "advanced", &["base"]).await;

    manager
        .load_with_dependencies(&ctx, "advanced", &LoadConfig::default())
        .await
        .unwrap();

    assert_eq!(log.loads(), ["base", "advanced"]);
    assert!(manager.is_loaded("base").await);
    assert!(manager.is_loaded("advanced").await);
}

#[tokio::test]
async fn test_diamond_activates_shared_dependency_once() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "d", &[]).await;
    register(&manager, &log, "b", &["d"]).await;
    register(&manager, &log, "c", &["d"]).await;
    register(&manager, &log, "a", &["b", "c"]).await;

    manager
        .load_with_dependencies(&ctx, "a", &LoadConfig::default())
        .await
        .unwrap();

    assert_eq!(log.loads(), ["d", "b", "c", "a"]);
    assert_eq!(manager.loaded_count().await, 4);
}

#[tokio::test]
async fn test_cycle_activates_nothing() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "root", &["x"]).await;
    register(&manager, &log, "x", &["y"]).await;
    register(&manager, &log, "y", &["x"]).await;

    let err = manager
        .load_with_dependencies(&ctx, "root", &LoadConfig::default())
        .await
        .unwrap_err();

    match err {
        SkillError::CircularDependency { path } => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"x".to_string()));
            assert!(path.contains(&"y".to_string()));
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
    assert!(log.entries().is_empty());
    assert_eq!(manager.loaded_count().await, 0);
}

#[tokio::test]
async fn test_missing_dependency_is_reported_before_any_load() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "a", &["present", "ghost"]).await;
    register(&manager, &log, "present", &[]).await;

    let err = manager
        .load_with_dependencies(&ctx, "a", &LoadConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SkillError::DependencyNotMet { ref skill_id, ref dependency }
            if skill_id == "a" && dependency == "ghost"
    ));
    assert!(log.loads().is_empty());
}

#[tokio::test]
async fn test_failed_dependency_aborts_cascade_and_keeps_earlier_loads() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "first", &[]).await;
    let broken = SkillBuilder::new("broken")
        .with_hook(log.hook("broken").failing_load())
        .build()
        .unwrap();
    manager.register(broken).await.unwrap();
    register(&manager, &log, "top", &["first", "broken"]).await;
    let mut events = manager.take_event_receiver().unwrap();

    let err = manager
        .load_with_dependencies(&ctx, "top", &LoadConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SkillError::LoadFailed { ref skill_id, .. } if skill_id == "broken"));
    assert_eq!(log.loads(), ["first", "broken"]);
    assert!(manager.is_loaded("first").await);
    assert!(!manager.is_loaded("broken").await);
    assert!(!manager.is_loaded("top").await);

    assert_eq!(
        events.recv().await,
        Some(SkillEvent::Loaded {
            skill_id: "first".into()
        })
    );
    assert!(matches!(
        events.recv().await,
        Some(SkillEvent::LoadFailed { ref skill_id, .. }) if skill_id == "broken"
    ));
}

#[tokio::test]
async fn test_unload_hook_failure_keeps_skill_loaded() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    let hook = log.hook("sticky");
    let skill = SkillBuilder::new("sticky")
        .with_hook(hook.clone())
        .build()
        .unwrap();
    manager.register(skill).await.unwrap();
    manager
        .load(&ctx, "sticky", &LoadConfig::default())
        .await
        .unwrap();

    hook.set_fail_unload(true);
    assert!(matches!(
        manager.unload(&ctx, "sticky").await,
        Err(SkillError::UnloadFailed { .. })
    ));
    assert!(manager.is_loaded("sticky").await);
    assert!(manager.unregister(&ctx, "sticky").await.is_err());
    assert_eq!(manager.count().await, 1);

    hook.set_fail_unload(false);
    manager.unregister(&ctx, "sticky").await.unwrap();
    assert_eq!(manager.count().await, 0);
}

#[tokio::test]
async fn test_unload_all_goes_dependents_first() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "base", &[]).await;
    register(&manager, &log, "mid", &["base"]).await;
    register(&manager, &log, "top", &["mid"]).await;
    manager
        .load_with_dependencies(&ctx, "top", &LoadConfig::default())
        .await
        .unwrap();

    manager.unload_all(&ctx).await.unwrap();

    assert_eq!(log.unloads(), ["top", "mid", "base"]);
    assert_eq!(manager.loaded_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loads_of_one_skill_succeed_once() {
    let manager = Arc::new(SkillManager::new());
    let log = LoadLog::new();
    register(&manager, &log, "shared", &[]).await;

    let results = join_all((0..16).map(|i| {
        let manager = manager.clone();
        tokio::spawn(async move {
            let ctx = SkillContext::new(format!("worker-{i}"));
            manager.load(&ctx, "shared", &LoadConfig::default()).await
        })
    }))
    .await;

    let ok = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(()))))
        .count();
    let already = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(SkillError::AlreadyLoaded(_)))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(already, 15);
    assert_eq!(log.loads(), ["shared"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counts_stay_consistent_under_concurrency() {
    let manager = Arc::new(SkillManager::new());
    let log = LoadLog::new();

    join_all((0..32).map(|i| {
        let manager = manager.clone();
        let log = log.clone();
        tokio::spawn(async move {
            let id = format!("skill-{i:02}");
            register(&manager, &log, &id, &[]).await;
            let ctx = SkillContext::new(id.clone());
            if i % 2 == 0 {
                manager.load(&ctx, &id, &LoadConfig::default()).await.unwrap();
            }
            if i % 4 == 0 {
                manager.unload(&ctx, &id).await.unwrap();
            }
        })
    }))
    .await
    .into_iter()
    .for_each(|r| r.unwrap());

    assert_eq!(manager.count().await, 32);
    assert_eq!(manager.loaded_count().await, 8);
    assert!(manager.loaded_count().await <= manager.count().await);
    for skill in manager.list_loaded().await {
        assert!(skill.is_loaded().await);
    }
}

#[tokio::test]
async fn test_find_by_tags_and_category() {
    let manager = SkillManager::new();
    for (id, category, tags) in [
        ("coding", SkillCategory::Coding, vec!["rust", "review"]),
        ("writer", SkillCategory::Creative, vec!["prose"]),
        ("linter", SkillCategory::Coding, vec!["review"]),
    ] {
        let skill = SkillBuilder::new(id)
            .with_category(category)
            .with_tags(tags)
            .build()
            .unwrap();
        manager.register(skill).await.unwrap();
    }

    let ids = |skills: Vec<Arc<dyn Skill>>| {
        skills
            .iter()
            .map(|s| s.id().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(manager.find_by_tags(&["review"]).await), ["coding", "linter"]);
    assert_eq!(
        ids(manager.find_by_tags(&["prose", "rust"]).await),
        ["coding", "writer"]
    );
    assert!(manager.find_by_tags::<&str>(&[]).await.is_empty());
    assert_eq!(
        ids(manager.find_by_category(SkillCategory::Coding).await),
        ["coding", "linter"]
    );
    assert!(
        manager
            .find_by_category(SkillCategory::Research)
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_progressive_levels_are_monotonic_and_cached() {
    let loader = CountingLoader::new(
        SkillInstructions::new("Review the diff."),
        SkillResources::new().with_script("lint.sh", "cargo clippy"),
    );
    let skill = ProgressiveSkillBuilder::new("review")
        .with_instructions_loader(loader.clone())
        .with_resources_loader(loader.clone())
        .build()
        .unwrap();
    let ctx = ctx();

    assert_eq!(skill.load_level().await, LoadLevel::Metadata);

    let resources = skill.load_resources(&ctx).await.unwrap();
    assert_eq!(skill.load_level().await, LoadLevel::Resources);
    assert!(!skill.is_instructions_loaded().await);

    let instructions = skill.load_instructions(&ctx).await.unwrap();
    assert_eq!(skill.load_level().await, LoadLevel::Resources);
    assert_eq!(instructions.system_prompt, "Review the diff.");

    let again = skill.load_instructions(&ctx).await.unwrap();
    assert!(Arc::ptr_eq(&instructions, &again));
    assert!(Arc::ptr_eq(
        &resources,
        &skill.load_resources(&ctx).await.unwrap()
    ));
    assert_eq!(loader.instruction_calls(), 1);
    assert_eq!(loader.resource_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_instruction_loads_hit_loader_once() {
    let loader = CountingLoader::new(SkillInstructions::new("prompt"), SkillResources::new())
        .with_delay(std::time::Duration::from_millis(20));
    let skill = Arc::new(
        ProgressiveSkillBuilder::new("slow")
            .with_instructions_loader(loader.clone())
            .build()
            .unwrap(),
    );

    let loaded = join_all((0..8).map(|_| {
        let skill = skill.clone();
        async move { skill.load_instructions(&ctx()).await.unwrap() }
    }))
    .await;

    assert_eq!(loader.instruction_calls(), 1);
    assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[tokio::test]
async fn test_meta_tool_coding_scenario() {
    let manager = Arc::new(SkillManager::new());
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "git", &[]).await;

    let coding = ProgressiveSkillBuilder::new("coding")
        .with_description("Write and refactor code")
        .with_category(SkillCategory::Coding)
        .with_tags(["rust", "refactor"])
        .with_dependency("git")
        .with_instructions(SkillInstructions::new("You are a careful programmer."))
        .with_resources(SkillResources::new().with_template("pr.md", "## Summary"))
        .with_action_handler(|request: ActionRequest| async move {
            let templates = request
                .resources
                .map(|r| r.templates.len())
                .unwrap_or_default();
            Ok::<_, BoxError>(json!({
                "action": request.action,
                "file": request.params.get("file").cloned(),
                "templates": templates,
            }))
        })
        .build()
        .unwrap();
    manager.register(coding).await.unwrap();

    let tool =
        SkillMetaTool::new(manager.clone()).with_load_config(LoadConfig::new().with_dependencies());

    let catalog = tool.invoke(&ctx, MetaToolRequest::list()).await.unwrap();
    match catalog {
        MetaToolResponse::Catalog { skills } => {
            let ids: Vec<_> = skills.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(ids, ["coding", "git"]);
        }
        other => panic!("expected catalog, got {other:?}"),
    }
    assert_eq!(manager.loaded_count().await, 0);

    let response = tool
        .invoke(
            &ctx,
            MetaToolRequest::use_skill("coding")
                .with_action("refactor")
                .with_param("file", json!("src/lib.rs")),
        )
        .await
        .unwrap();

    match response {
        MetaToolResponse::Executed {
            skill_id,
            action,
            result,
            instructions,
        } => {
            assert_eq!(skill_id, "coding");
            assert_eq!(action, "refactor");
            assert_eq!(result["file"], "src/lib.rs");
            assert_eq!(result["templates"], 1);
            assert_eq!(
                instructions.unwrap().system_prompt,
                "You are a careful programmer."
            );
        }
        other => panic!("expected execution, got {other:?}"),
    }
    assert_eq!(log.loads(), ["git"]);
    assert!(manager.is_loaded("coding").await);

    // A second call reuses the activation.
    tool.invoke(&ctx, MetaToolRequest::use_skill("coding"))
        .await
        .unwrap();
    assert_eq!(log.loads(), ["git"]);
}

#[tokio::test]
async fn test_meta_tool_acknowledges_basic_skill_through_tool_surface() {
    let manager = Arc::new(SkillManager::new());
    let skill = SkillBuilder::new("summarize")
        .with_system_prompt("Summarize in three bullet points.")
        .build()
        .unwrap();
    manager.register(skill).await.unwrap();
    let tool = SkillMetaTool::new(manager.clone());
    let ctx = ctx();

    let result = tool
        .execute(
            ToolInput::from_json(json!({"skill_name": "summarize", "params": {"text": "..."}})),
            &ctx,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.output["type"], "acknowledged");
    assert_eq!(result.output["skill_id"], "summarize");
    assert_eq!(
        result.output["instructions"]["system_prompt"],
        "Summarize in three bullet points."
    );
    assert!(manager.is_loaded("summarize").await);

    let missing = tool
        .execute(ToolInput::from_json(json!({"skill_name": "nope"})), &ctx)
        .await;
    assert!(!missing.success);
}

#[tokio::test]
async fn test_loaded_tools_come_from_loaded_skills() {
    let manager = SkillManager::new();
    let ctx = ctx();
    let search = MockTool::new("search", "Search the codebase", json!({"type": "object"}));
    let skill = SkillBuilder::new("explorer")
        .with_tool(Arc::new(search.clone()))
        .build()
        .unwrap();
    manager.register(skill).await.unwrap();

    assert!(manager.loaded_tools().await.is_empty());
    manager
        .load(&ctx, "explorer", &LoadConfig::default())
        .await
        .unwrap();

    let tools = manager.loaded_tools().await;
    assert_eq!(tools.len(), 1);
    tools[0]
        .execute(ToolInput::from_json(json!({"q": "fn main"})), &ctx)
        .await;
    skillkit_testing::assert_tool_called!(search, 1);
    let history = search.history().await;
    assert_eq!(history[0].get_str("q"), Some("fn main"));
}

#[tokio::test]
async fn test_second_branch_of_diamond_reuses_loaded_dependency() {
    let manager = SkillManager::new();
    let log = LoadLog::new();
    let ctx = ctx();
    register(&manager, &log, "c", &[]).await;
    register(&manager, &log, "a", &["c"]).await;
    register(&manager, &log, "b", &["c"]).await;

    manager
        .load_with_dependencies(&ctx, "a", &LoadConfig::default())
        .await
        .unwrap();
    manager
        .load_with_dependencies(&ctx, "b", &LoadConfig::default())
        .await
        .unwrap();

    assert_eq!(log.loads(), ["c", "a", "b"]);
    assert_eq!(manager.loaded_count().await, 3);
}

#[tokio::test]
async fn test_coding_skill_load_unload_scenario() {
    let manager = SkillManager::new();
    let ctx = ctx();
    let coding = SkillBuilder::new("coding")
        .with_category(SkillCategory::Coding)
        .with_tags(["coding", "debug"])
        .build()
        .unwrap();
    manager.register(coding).await.unwrap();

    manager
        .load(&ctx, "coding", &LoadConfig::default())
        .await
        .unwrap();
    assert!(manager.is_loaded("coding").await);
    assert_eq!(manager.loaded_count().await, 1);
    assert_eq!(manager.list_loaded().await.len(), manager.loaded_count().await);

    manager.unload(&ctx, "coding").await.unwrap();
    assert!(!manager.is_loaded("coding").await);
    assert_eq!(manager.loaded_count().await, 0);
    assert_eq!(manager.list().await.len(), manager.count().await);
}

#[tokio::test]
async fn test_unload_through_manager_resets_progressive_level() {
    let manager = SkillManager::new();
    let ctx = ctx();
    let loader = CountingLoader::new(SkillInstructions::new("v1"), SkillResources::new());
    let skill = Arc::new(
        ProgressiveSkillBuilder::new("docs")
            .with_instructions_loader(loader.clone())
            .with_resources_loader(loader.clone())
            .build()
            .unwrap(),
    );
    manager.register_arc(skill.clone()).await.unwrap();

    manager.load(&ctx, "docs", &LoadConfig::default()).await.unwrap();
    skill.load_instructions(&ctx).await.unwrap();
    skill.load_resources(&ctx).await.unwrap();
    assert_eq!(skill.load_level().await, LoadLevel::Resources);

    manager.unload(&ctx, "docs").await.unwrap();
    assert_eq!(skill.load_level().await, LoadLevel::Metadata);
    assert!(!skill.is_instructions_loaded().await);
    assert!(!skill.is_resources_loaded().await);

    // Cache was discarded, so the loader runs again.
    skill.load_instructions(&ctx).await.unwrap();
    assert_eq!(loader.instruction_calls(), 2);
}
