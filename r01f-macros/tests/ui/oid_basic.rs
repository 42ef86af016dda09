use r01f_domain::oid::Oid;
use r01f_macros::oid;
use std::collections::HashSet;

#[oid]
struct UserOid(uuid::Uuid);

#[oid(debug = false)]
struct ProfileOid(String);

impl std::fmt::Debug for ProfileOid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileOid(..)")
    }
}

fn main() {
    let id = UserOid::generate();
    let parsed: UserOid = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);

    let mut seen = HashSet::new();
    seen.insert(id.clone());
    assert!(seen.contains(&id));

    let raw: uuid::Uuid = id.into();
    assert!(!raw.is_nil());

    let pid = ProfileOid::from("p-1".to_string());
    assert_eq!(pid.as_ref(), "p-1");
    assert_eq!(format!("{:?}", pid), "ProfileOid(..)");
}
