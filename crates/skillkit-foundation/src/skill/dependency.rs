//! 技能依赖解析
//! Skill dependency resolution
//!
//! Pure graph walks over the registry snapshot. The manager holds its lock while calling these,
//! so the graph cannot change between the cycle check and activation.
//!
//! Ids that are not registered contribute no edges during the cycle check; they surface as
//! [`SkillError::DependencyNotMet`] once activation reaches them.

use skillkit_kernel::{Skill, SkillError, SkillResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Registered skills keyed by id.
pub type SkillMap = HashMap<String, Arc<dyn Skill>>;

fn dependencies_of<'a>(skills: &'a SkillMap, id: &str) -> &'a [String] {
    skills.get(id).map(|s| s.dependencies()).unwrap_or(&[])
}

/// 检测从 `root` 可达的依赖环
/// Detect a cycle in the graph reachable from `root`
///
/// Uses a visiting stack that lives only for this call. Returns
/// [`SkillError::CircularDependency`] with the closing path (`a -> b -> a`) or
/// [`SkillError::DependencyDepthExceeded`] when a chain is longer than `max_depth`.
pub fn detect_cycle(skills: &SkillMap, root: &str, max_depth: usize) -> SkillResult<()> {
    let mut stack: Vec<String> = Vec::new();
    let mut finished: HashMap<String, usize> = HashMap::new();
    visit(skills, root, root, max_depth, &mut stack, &mut finished)
}

fn visit(
    skills: &SkillMap,
    root: &str,
    id: &str,
    max_depth: usize,
    stack: &mut Vec<String>,
    finished: &mut HashMap<String, usize>,
) -> SkillResult<()> {
    if let Some(pos) = stack.iter().position(|s| s == id) {
        let mut path = stack[pos..].to_vec();
        path.push(id.to_string());
        return Err(SkillError::CircularDependency { path });
    }
    // Finished nodes hold no cycle; their depth is only settled when reached no deeper than
    // the deepest clean walk so far.
    let depth = stack.len();
    if finished.get(id).is_some_and(|&walked| depth <= walked) {
        return Ok(());
    }
    if depth > max_depth {
        return Err(SkillError::DependencyDepthExceeded {
            skill_id: root.to_string(),
            max_depth,
        });
    }

    stack.push(id.to_string());
    for dep in dependencies_of(skills, id) {
        if skills.contains_key(dep) {
            visit(skills, root, dep, max_depth, stack, finished)?;
        }
    }
    stack.pop();
    let walked = finished.entry(id.to_string()).or_insert(depth);
    *walked = (*walked).max(depth);
    Ok(())
}

/// 计算激活顺序（后序遍历，依赖在前）
/// Compute the activation order for `root`: dependencies first, `root` last
///
/// Skills in `loaded` are skipped together with their subtrees. `root` is included only when
/// it is not loaded itself. Call [`detect_cycle`] first; this walk assumes an acyclic graph.
pub fn activation_order(
    skills: &SkillMap,
    loaded: &HashSet<String>,
    root: &str,
) -> SkillResult<Vec<String>> {
    if !skills.contains_key(root) {
        return Err(SkillError::NotFound(root.to_string()));
    }

    let mut order = Vec::new();
    let mut planned = HashSet::new();
    collect(skills, loaded, root, &mut order, &mut planned)?;
    if !loaded.contains(root) {
        order.push(root.to_string());
    }
    Ok(order)
}

fn collect(
    skills: &SkillMap,
    loaded: &HashSet<String>,
    id: &str,
    order: &mut Vec<String>,
    planned: &mut HashSet<String>,
) -> SkillResult<()> {
    for dep in dependencies_of(skills, id) {
        if loaded.contains(dep) || planned.contains(dep) {
            continue;
        }
        if !skills.contains_key(dep) {
            return Err(SkillError::DependencyNotMet {
                skill_id: id.to_string(),
                dependency: dep.clone(),
            });
        }
        collect(skills, loaded, dep, order, planned)?;
        planned.insert(dep.clone());
        order.push(dep.clone());
    }
    Ok(())
}

/// 直接依赖 `id` 的技能（按 ID 排序）
/// Registered skills that declare `id` as a direct dependency, sorted by id
pub fn dependents_of(skills: &SkillMap, id: &str) -> Vec<String> {
    let mut dependents: Vec<String> = skills
        .values()
        .filter(|s| s.dependencies().iter().any(|d| d == id))
        .map(|s| s.id().to_string())
        .collect();
    dependents.sort();
    dependents
}

/// 卸载顺序：依赖者在前
/// Unload order for the `loaded` set: dependents before their dependencies
///
/// Tolerates cycles among loaded skills (possible when they were loaded one by one); the order
/// inside a cycle is then arbitrary but deterministic.
pub fn unload_order(skills: &SkillMap, loaded: &HashSet<String>) -> Vec<String> {
    let mut ids: Vec<&String> = loaded.iter().collect();
    ids.sort();

    let mut order = Vec::with_capacity(ids.len());
    let mut seen = HashSet::new();
    for id in ids {
        post_order(skills, loaded, id, &mut seen, &mut order);
    }
    order.reverse();
    order
}

fn post_order(
    skills: &SkillMap,
    loaded: &HashSet<String>,
    id: &str,
    seen: &mut HashSet<String>,
    order: &mut Vec<String>,
) {
    if !seen.insert(id.to_string()) {
        return;
    }
    for dep in dependencies_of(skills, id) {
        if loaded.contains(dep) {
            post_order(skills, loaded, dep, seen, order);
        }
    }
    order.push(id.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::BaseSkill;

    fn graph(edges: &[(&str, &[&str])]) -> SkillMap {
        edges
            .iter()
            .map(|(id, deps)| {
                let skill = BaseSkill::builder(*id)
                    .with_dependencies(deps.iter().copied())
                    .build()
                    .unwrap();
                (id.to_string(), Arc::new(skill) as Arc<dyn Skill>)
            })
            .collect()
    }

    #[test]
    fn test_detects_two_node_cycle() {
        let skills = graph(&[("a", &["b"]), ("b", &["a"])]);
        match detect_cycle(&skills, "a", 64) {
            Err(SkillError::CircularDependency { path }) => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let skills = graph(&[("a", &["a"])]);
        assert!(matches!(
            detect_cycle(&skills, "a", 64),
            Err(SkillError::CircularDependency { .. })
        ));
    }

    #[test]
    fn test_unreachable_cycle_is_ignored() {
        let skills = graph(&[("a", &["b"]), ("b", &[]), ("x", &["y"]), ("y", &["x"])]);
        assert!(detect_cycle(&skills, "a", 64).is_ok());
    }

    #[test]
    fn test_missing_dependency_has_no_edges_during_cycle_check() {
        let skills = graph(&[("a", &["ghost"])]);
        assert!(detect_cycle(&skills, "a", 64).is_ok());
        assert!(matches!(
            activation_order(&skills, &HashSet::new(), "a"),
            Err(SkillError::DependencyNotMet { ref dependency, .. }) if dependency == "ghost"
        ));
    }

    #[test]
    fn test_diamond_activation_order() {
        let skills = graph(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &["d"]), ("d", &[])]);
        assert!(detect_cycle(&skills, "a", 64).is_ok());

        let order = activation_order(&skills, &HashSet::new(), "a").unwrap();
        assert_eq!(order, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_loaded_subtrees_are_skipped() {
        let skills = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        let loaded: HashSet<String> = ["b".to_string()].into_iter().collect();
        assert_eq!(activation_order(&skills, &loaded, "a").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_depth_limit() {
        let skills = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["d"]), ("d", &[])]);
        assert!(detect_cycle(&skills, "a", 3).is_ok());
        assert!(matches!(
            detect_cycle(&skills, "a", 2),
            Err(SkillError::DependencyDepthExceeded { max_depth: 2, .. })
        ));
    }

    #[test]
    fn test_depth_limit_ignores_dependency_order() {
        // Same chain a -> b -> c -> x -> y, with x also a direct dependency of a.
        for direct in [&["x", "b"][..], &["b", "x"][..]] {
            let skills = graph(&[
                ("a", direct),
                ("b", &["c"]),
                ("c", &["x"]),
                ("x", &["y"]),
                ("y", &[]),
            ]);
            assert!(
                matches!(
                    detect_cycle(&skills, "a", 2),
                    Err(SkillError::DependencyDepthExceeded { ref skill_id, max_depth: 2 })
                        if skill_id == "a"
                ),
                "order {direct:?}"
            );
            assert!(
                matches!(
                    detect_cycle(&skills, "a", 3),
                    Err(SkillError::DependencyDepthExceeded { .. })
                ),
                "order {direct:?}"
            );
            assert!(detect_cycle(&skills, "a", 4).is_ok(), "order {direct:?}");
        }
    }

    #[test]
    fn test_dependents_and_unload_order() {
        let skills = graph(&[("app", &["lib"]), ("tool", &["lib"]), ("lib", &[])]);
        assert_eq!(dependents_of(&skills, "lib"), vec!["app", "tool"]);

        let loaded: HashSet<String> = ["app", "tool", "lib"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let order = unload_order(&skills, &loaded);
        assert_eq!(order.last().map(String::as_str), Some("lib"));
        assert_eq!(order.len(), 3);
    }
}
