#[test]
fn ui_pass() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/model_object_basic.rs");
    t.pass("tests/ui/oid_basic.rs");
}
