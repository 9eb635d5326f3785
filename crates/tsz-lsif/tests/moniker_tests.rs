use super::*;
use crate::checker::symbol_flags;
use crate::export_path::Segment;
use crate::test_fixtures::SnapshotBuilder;

fn document(uri: &str, module_name: Option<&str>) -> DocumentInfo {
    DocumentInfo {
        uri: uri.to_string(),
        language_id: "typescript".to_string(),
        external: false,
        module_name: module_name.map(str::to_string),
    }
}

#[test]
fn module_alias_is_root_relative_without_extension() {
    assert_eq!(module_alias(&document("/@test/a.ts", None), "/@test"), "a");
    assert_eq!(
        module_alias(&document("/@test/lib/util.d.ts", None), "/@test/"),
        "lib/util"
    );
    assert_eq!(
        module_alias(&document("file:///proj/src/view.tsx", None), "file:///proj"),
        "src/view"
    );
    assert_eq!(module_alias(&document("/other/b.js", None), "/@test"), "other/b");
}

#[test]
fn module_alias_prefers_explicit_module_name() {
    let info = document("/@test/node_modules/mobx/index.d.ts", Some("mobx"));
    assert_eq!(module_alias(&info, "/@test"), "mobx");
}

#[test]
fn path_moniker_is_group_unique_export() {
    let path = ExportPath::root()
        .child(Segment::Name("N".to_string()))
        .child(Segment::Name("a".to_string()));
    let moniker = path_moniker("tsc", "a", &path, MonikerKind::Export);

    assert_eq!(moniker.identifier, "a:N.a");
    assert_eq!(moniker.unique, UniquenessLevel::Group);
    assert_eq!(moniker.kind, MonikerKind::Export);
}

#[test]
fn digest_identifier_is_24_base64_chars() {
    let identifier = digest_identifier("/@test/a.ts", "|12|foo|{}");
    assert_eq!(identifier.len(), 24);
    assert!(identifier.ends_with("=="));
    assert_eq!(identifier, digest_identifier("/@test/a.ts", "|12|foo|{}"));
    assert_ne!(identifier, digest_identifier("/@test/b.ts", "|12|foo|{}"));
}

#[test]
fn digest_identifier_known_value() {
    // sha256("u\ns") truncated to 16 bytes
    assert_eq!(digest_identifier("u", "s"), "oBzjPH5QyL9sV1YgEUTIXA==");
}

struct Shapes {
    snapshot: crate::snapshot::ProgramSnapshot,
    key_value: TypeId,
    value_key: TypeId,
    with_extra: TypeId,
    retyped: TypeId,
}

fn shapes() -> Shapes {
    let mut b = SnapshotBuilder::new("/@test");
    let number = b.primitive("number");
    let string = b.primitive("string");

    let key = b.symbol("key", symbol_flags::PROPERTY, None);
    let value = b.symbol("value", symbol_flags::PROPERTY, None);
    let extra = b.symbol("extra", symbol_flags::PROPERTY, None);
    let key_as_string = b.symbol("key", symbol_flags::PROPERTY, None);
    for member in [key, value, extra] {
        b.set_type(member, number);
    }
    b.set_type(key_as_string, string);

    let key_value = b.object_type(None, &[key, value]);
    let value_key = b.object_type(None, &[value, key]);
    let with_extra = b.object_type(None, &[key, value, extra]);
    let retyped = b.object_type(None, &[key_as_string, value]);

    Shapes {
        snapshot: b.build(),
        key_value,
        value_key,
        with_extra,
        retyped,
    }
}

#[test]
fn structural_hash_ignores_member_order() {
    let s = shapes();
    let hasher = StructuralHasher::new(&s.snapshot);

    assert_eq!(hasher.canonical_type(s.key_value), "{key:number;value:number}");
    assert_eq!(
        hasher.hash_type("/@test/a.ts", s.key_value),
        hasher.hash_type("/@test/a.ts", s.value_key)
    );
}

#[test]
fn structural_hash_changes_with_members() {
    let s = shapes();
    let hasher = StructuralHasher::new(&s.snapshot);
    let base = hasher.hash_type("/@test/a.ts", s.key_value);

    assert_ne!(base, hasher.hash_type("/@test/a.ts", s.with_extra));
    assert_ne!(base, hasher.hash_type("/@test/a.ts", s.retyped));
}

#[test]
fn nominal_types_render_by_name() {
    let mut b = SnapshotBuilder::new("/@test");
    let boolean = b.primitive("boolean");
    let touch = b.symbol("touch", symbol_flags::PROPERTY, None);
    b.set_type(touch, boolean);
    let foo = b.symbol("Foo", symbol_flags::INTERFACE, None);
    let foo_type = b.object_type(Some(foo), &[touch]);
    b.set_type(foo, foo_type);
    let field = b.symbol("foo", symbol_flags::PROPERTY, None);
    b.set_type(field, foo_type);
    let holder = b.object_type(None, &[field]);
    let snapshot = b.build();

    let hasher = StructuralHasher::new(&snapshot);
    assert_eq!(hasher.canonical_type(holder), "{foo:ref(Foo)}");
}

#[test]
fn cyclic_types_terminate() {
    let mut b = SnapshotBuilder::new("/@test");
    let next = b.symbol("next", symbol_flags::PROPERTY, None);
    let node = b.object_type(None, &[next]);
    b.set_type(next, node);
    let snapshot = b.build();

    let hasher = StructuralHasher::new(&snapshot);
    assert_eq!(hasher.canonical_type(node), "{next:<cycle>}");
}

#[test]
fn signatures_render_parameters_and_return() {
    let mut b = SnapshotBuilder::new("/@test");
    let number = b.primitive("number");
    let void = b.primitive("void");
    let x = b.symbol("x", symbol_flags::FUNCTION_SCOPED_VARIABLE, None);
    b.set_type(x, number);
    let function = b.function_type(&[x], void);
    let snapshot = b.build();

    let hasher = StructuralHasher::new(&snapshot);
    assert_eq!(hasher.canonical_type(function), "{(x:number)=>void}");
}

#[test]
fn local_identifier_needs_a_resolved_type() {
    let mut b = SnapshotBuilder::new("/@test");
    let a = b.document("a.ts", "let foo; let bar = 1;");
    let number = b.primitive("number");
    let foo = b.symbol("foo", symbol_flags::BLOCK_SCOPED_VARIABLE, None);
    b.declare(foo, a, 0, "");
    let bar = b.symbol("bar", symbol_flags::BLOCK_SCOPED_VARIABLE, None);
    b.declare(bar, a, 0, "");
    b.set_type(bar, number);
    let snapshot = b.build();

    let hasher = StructuralHasher::new(&snapshot);
    assert_eq!(hasher.local_identifier("/@test/a.ts", foo), None);
    let identifier = hasher.local_identifier("/@test/a.ts", bar).unwrap();
    assert_eq!(identifier.len(), 24);
    assert_eq!(
        hasher.symbol_signature(bar).as_deref(),
        Some("|13|bar|number")
    );
}

#[test]
fn anonymous_containers_render_structurally() {
    let mut b = SnapshotBuilder::new("/@test");
    let boolean = b.primitive("boolean");
    let literal = b.symbol("__type", symbol_flags::TYPE_LITERAL, None);
    let touch = b.symbol("touch", symbol_flags::PROPERTY, Some(literal));
    b.set_type(touch, boolean);
    let literal_type = b.object_type(Some(literal), &[touch]);
    b.set_type(literal, literal_type);
    let namespace = b.symbol("N", symbol_flags::NAMESPACE_MODULE, None);
    let member = b.symbol("a", symbol_flags::BLOCK_SCOPED_VARIABLE, Some(namespace));
    b.set_type(member, boolean);
    let snapshot = b.build();

    let hasher = StructuralHasher::new(&snapshot);
    assert_eq!(
        hasher.symbol_signature(touch).as_deref(),
        Some("{touch:boolean}|7|touch|boolean")
    );
    assert_eq!(hasher.symbol_signature(member).as_deref(), Some("N|13|a|boolean"));
}

#[test]
fn declarations_separate_same_shaped_locals() {
    // function f() { xs.map((item) => item); ys.map((item) => item); }
    // const a = { touch: true }; const b = { touch: false };
    let mut b = SnapshotBuilder::new("/@test");
    let doc = b.document(
        "a.ts",
        "function f() { xs.map((item) => item); ys.map((item) => item); }\nconst a = { touch: true }; const b = { touch: false };",
    );
    let number = b.primitive("number");
    let boolean = b.primitive("boolean");
    let mut items = Vec::new();
    for occurrence in [0, 2] {
        let callback = b.symbol("__function", symbol_flags::FUNCTION, None);
        let item = b.symbol("item", symbol_flags::FUNCTION_SCOPED_VARIABLE, Some(callback));
        b.set_type(item, number);
        b.declare(item, doc, occurrence, "");
        items.push(item);
    }
    let mut touches = Vec::new();
    for occurrence in [0, 1] {
        let literal = b.symbol("__object", symbol_flags::OBJECT_LITERAL, None);
        let touch = b.symbol("touch", symbol_flags::PROPERTY, Some(literal));
        b.set_type(touch, boolean);
        b.declare(touch, doc, occurrence, "");
        let shape = b.object_type(Some(literal), &[touch]);
        b.set_type(literal, shape);
        touches.push(touch);
    }
    let snapshot = b.build();
    let hasher = StructuralHasher::new(&snapshot);

    assert!(!hasher.is_structural_member(items[0]));
    assert_eq!(hasher.symbol_signature(items[0]), hasher.symbol_signature(items[1]));
    assert_ne!(
        hasher.local_identifier("/@test/a.ts", items[0]),
        hasher.local_identifier("/@test/a.ts", items[1])
    );

    assert!(hasher.is_structural_member(touches[0]));
    assert_eq!(
        hasher.local_identifier("/@test/a.ts", touches[0]),
        hasher.local_identifier("/@test/a.ts", touches[1])
    );
}
