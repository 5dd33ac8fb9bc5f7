use proptest::prelude::*;
use sitemap_scrub::{prune_tag, pruned, replace_text, replaced, Map, Scrub, Value};

fn arb_tree() -> impl Strategy<Value = Value> {
    let leaf = "[ab. x]{0,8}".prop_map(Value::Text);
    leaf.prop_recursive(4, 64, 6, |inner| {
        let key = prop::sample::select(vec!["a", "b", "loc", "PageMap", "image:image", "$", "_"]);
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec((key, inner), 0..5).prop_map(|entries| {
                Value::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect::<Map>(),
                )
            }),
        ]
    })
}

fn arb_tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "PageMap", "image:image", "$", "absent"])
}

// `Value` equality ignores key order, this doesn't.
#[derive(Debug, PartialEq)]
enum Ordered {
    Text(String),
    Map(Vec<(String, Ordered)>),
    List(Vec<Ordered>),
}

fn ordered(tree: &Value) -> Ordered {
    match tree {
        Value::Text(text) => Ordered::Text(text.clone()),
        Value::Map(map) => Ordered::Map(map.iter().map(|(k, v)| (k.clone(), ordered(v))).collect()),
        Value::List(list) => Ordered::List(list.iter().map(ordered).collect()),
    }
}

// Same containers and keys, leaves blanked.
fn shape(tree: &Value) -> Ordered {
    match tree {
        Value::Text(_) => Ordered::Text(String::new()),
        Value::Map(map) => Ordered::Map(map.iter().map(|(k, v)| (k.clone(), shape(v))).collect()),
        Value::List(list) => Ordered::List(list.iter().map(shape).collect()),
    }
}

// Reference pruning: drop every `tag` entry, keep everything else in place.
fn without(tree: Ordered, tag: &str) -> Ordered {
    match tree {
        Ordered::Text(text) => Ordered::Text(text),
        Ordered::Map(entries) => Ordered::Map(
            entries
                .into_iter()
                .filter(|(k, _)| k != tag)
                .map(|(k, v)| (k, without(v, tag)))
                .collect(),
        ),
        Ordered::List(list) => Ordered::List(list.into_iter().map(|v| without(v, tag)).collect()),
    }
}

proptest! {
    #[test]
    fn prune_is_idempotent(tree in arb_tree(), tag in arb_tag()) {
        let once = pruned(tree, tag);
        prop_assert_eq!(ordered(&pruned(once.clone(), tag)), ordered(&once));
    }

    #[test]
    fn prune_is_complete(tree in arb_tree(), tag in arb_tag()) {
        prop_assert!(!pruned(tree, tag).contains_key(tag));
    }

    #[test]
    fn prune_of_missing_tag_is_noop(tree in arb_tree()) {
        let mut copy = tree.clone();
        prop_assert_eq!(prune_tag(&mut copy, "urlset"), 0);
        prop_assert_eq!(ordered(&copy), ordered(&tree));
    }

    #[test]
    fn prune_keeps_order_of_survivors(tree in arb_tree(), tag in arb_tag()) {
        let expected = without(ordered(&tree), tag);
        prop_assert_eq!(ordered(&pruned(tree, tag)), expected);
    }

    // The replacement shares no characters with the search text, so no new match
    // can form where replaced and original text meet.
    #[test]
    fn replace_is_total(tree in arb_tree(), search in "[ab.]{1,3}", replace in "[yz]{1,3}") {
        let result = replaced(tree, &search, &replace);
        for leaf in result.leaves() {
            prop_assert!(!leaf.contains(search.as_str()), "{:?} still contains {:?}", leaf, search);
        }
    }

    #[test]
    fn replace_preserves_structure(tree in arb_tree(), search in "[ab.]{0,3}", replace in "[a-z]{0,3}") {
        let before = shape(&tree);
        prop_assert_eq!(shape(&replaced(tree, &search, &replace)), before);
    }

    #[test]
    fn replace_then_prune_equals_prune_then_replace(
        tree in arb_tree(),
        tag in arb_tag(),
        search in "[ab.]{1,2}",
        replace in "[a-z]{0,2}"
    ) {
        let replace_first = pruned(replaced(tree.clone(), &search, &replace), tag);
        let prune_first = replaced(pruned(tree, tag), &search, &replace);
        prop_assert_eq!(ordered(&replace_first), ordered(&prune_first));
    }
}

#[test]
fn scenario_replace_and_prune() {
    let mut tree = Value::from([
        ("a", Value::from("foo bar")),
        (
            "b",
            Value::from([
                ("image:image", Value::from([("image:loc", "foo.jpg")])),
                ("c", Value::from("foo")),
            ]),
        ),
    ]);
    Scrub::new("foo", "baz")
        .with_prune_tags(vec!["image:image"])
        .apply(&mut tree);
    let expected = Value::from([
        ("a", Value::from("baz bar")),
        ("b", Value::from([("c", "baz")])),
    ]);
    assert_eq!(tree, expected);
}

#[test]
fn scenario_no_match_only_prunes() {
    let tree = Value::from([
        ("loc", Value::from("https://example.com/")),
        ("PageMap", Value::from([("DataObject", "x")])),
    ]);
    let mut scrubbed = tree.clone();
    let report = Scrub::new("staging", "www").apply(&mut scrubbed);
    assert_eq!(report.replaced_leaves, 0);
    assert_eq!(scrubbed, pruned(tree, "PageMap"));
}

#[test]
fn scenario_page_maps_at_any_depth() {
    let page_map = || Value::from([("DataObject", "thumbnail")]);
    let mut tree = Value::from([(
        "urlset",
        Value::from(vec![
            Value::from([("loc", Value::from("1")), ("PageMap", page_map())]),
            Value::from([(
                "nested",
                Value::from(vec![Value::from([
                    ("PageMap", page_map()),
                    ("loc", Value::from("2")),
                ])]),
            )]),
            Value::from([("PageMap", Value::from(vec![page_map(), page_map()]))]),
        ]),
    )]);
    assert_eq!(prune_tag(&mut tree, "PageMap"), 3);
    assert!(!tree.contains_key("PageMap"));
    let leaves: Vec<&str> = tree.leaves().collect();
    assert_eq!(leaves, vec!["1", "2"]);
}

#[test]
fn scenario_search_is_literal() {
    let mut tree = Value::from([("a", "a.b"), ("b", "axb"), ("c", "a.b.a.b")]);
    assert_eq!(replace_text(&mut tree, "a.b", "Z"), 2);
    assert_eq!(tree, Value::from([("a", "Z"), ("b", "axb"), ("c", "Z.Z")]));
}

#[test]
fn scenario_empty_search_is_noop() {
    let tree = Value::from([("a", Value::from("abc")), ("b", Value::from(vec![Value::from("")]))]);
    let mut scrubbed = tree.clone();
    assert_eq!(replace_text(&mut scrubbed, "", "x"), 0);
    assert_eq!(scrubbed, tree);
}
