use codex::{CodexConfig, Entry, IdScheme, Registry};
use codex_demo::{Node, run_scenario};
use pretty_assertions::assert_eq;

fn sequential_config() -> CodexConfig {
    CodexConfig {
        id_scheme: IdScheme::Sequential,
        ..CodexConfig::default()
    }
}

#[test]
fn scenario_walks_tree_to_empty() {
    let scenario = run_scenario(&CodexConfig::default(), 3).unwrap();

    assert_eq!(scenario.initial.len(), 4);
    assert_eq!(scenario.after_child_removal.len(), 3);
    assert!(scenario.after_root_removal.is_empty());

    let child = scenario.removed_child.unwrap();
    assert!(scenario.initial.description(child).is_some());
    assert!(scenario.after_child_removal.description(child).is_none());
    assert_eq!(
        scenario.after_child_removal.description(scenario.root),
        Some("Node 'root'\nchildren: 2")
    );
}

#[test]
fn scenario_without_children_only_removes_root() {
    let scenario = run_scenario(&sequential_config(), 0).unwrap();

    assert_eq!(scenario.removed_child, None);
    assert_eq!(scenario.initial, scenario.after_child_removal);
    assert_eq!(scenario.initial.description(scenario.root), Some("Node 'root'"));
    assert!(scenario.after_root_removal.is_empty());
}

#[test]
fn sequential_scenario_renders_stable_report() {
    let scenario = run_scenario(&sequential_config(), 1).unwrap();
    let rule = "+---------------------------------------------";
    let root = "00000000-0000-0000-0000-000000000001";
    let child = "00000000-0000-0000-0000-000000000002";
    let pad = " ".repeat(root.len() + 7);

    let expected = format!(
        "{rule}\n| Codex:\n\
         |    [{root}] Node 'root'\n|{pad}children: 1\n\
         |    [{child}] Node 'child-0'\n|{pad}parent: {root}\n\
         {rule}"
    );
    assert_eq!(scenario.initial.to_string(), expected);
}

#[test]
fn add_child_links_both_directions() {
    let registry = Registry::new();
    let mut locked = registry.lock();
    let root = Node::add_root(&mut locked, "root").unwrap();
    let child = Node::add_child(&mut locked, root, "leaf").unwrap();

    assert_eq!(locked.lookup::<Node>(root).unwrap().children, vec![child]);
    assert_eq!(locked.lookup::<Node>(child).unwrap().parent, Some(root));
}

#[test]
fn add_child_under_missing_parent_is_detached() {
    let registry = Registry::new();
    let mut locked = registry.lock();
    let root = Node::add_root(&mut locked, "root").unwrap();
    locked.remove(root);

    let orphan = Node::add_child(&mut locked, root, "orphan").unwrap();
    let node = locked.lookup::<Node>(orphan).unwrap();
    assert_eq!(node.parent, None);
    assert_eq!(node.id(), orphan);
}

#[test]
fn removing_root_cascades_through_subtree() {
    let registry = Registry::new();
    let (root, other) = {
        let mut locked = registry.lock();
        let root = Node::add_root(&mut locked, "root").unwrap();
        let a = Node::add_child(&mut locked, root, "a").unwrap();
        Node::add_child(&mut locked, a, "a1").unwrap();
        Node::add_child(&mut locked, root, "b").unwrap();
        let other = Node::add_root(&mut locked, "other").unwrap();
        (root, other)
    };
    assert_eq!(registry.len(), 5);

    registry.remove(root);

    assert_eq!(registry.ids(), vec![other]);
}

#[test]
fn scenario_serializes_to_json() {
    let scenario = run_scenario(&sequential_config(), 2).unwrap();
    let json: serde_json::Value = serde_json::to_value(&scenario).unwrap();

    assert_eq!(json["root"], "00000000-0000-0000-0000-000000000001");
    assert_eq!(json["initial"]["entries"].as_array().unwrap().len(), 3);
    assert_eq!(json["after_root_removal"]["entries"], serde_json::json!([]));
}
