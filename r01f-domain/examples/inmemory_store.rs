//! 内存存储使用示例
//!
//! 展示模型对象在存储中的版本演进：创建得到 v1，
//! 无修改合并保持版本，有修改合并递增版本，过期版本被拒绝。
//!
//! 运行示例：
//! ```bash
//! cargo run -p r01f-domain --example inmemory_store
//! ```

use r01f_domain::error::DomainError;
use r01f_domain::model_object::ModelObject;
use r01f_domain::persist::{InMemoryModelObjectStore, MergeOutcome, ModelObjectStore};
use r01f_macros::{model_object, oid};

#[oid]
struct CityOid(String);

#[model_object(oid = CityOid, tag = "city")]
#[derive(Clone)]
struct City {
    name: String,
    population: u64,
}

#[tokio::main]
async fn main() -> Result<(), DomainError> {
    let store = InMemoryModelObjectStore::<City>::new();

    let mut city = City {
        name: "Bilbao".into(),
        population: 345_000,
        ..Default::default()
    };
    city.set_oid(CityOid::new("bio".into()));

    let v1 = store.persist(city).await?;
    println!("persisted {} as {}", v1.name, v1.entity_version());

    match store.merge(v1.clone()).await? {
        MergeOutcome::NotModified(c) => println!("unchanged, still {}", c.entity_version()),
        MergeOutcome::Updated(c) => println!("unexpected update to {}", c.entity_version()),
    }

    let mut grown = v1.clone();
    grown.population = 346_000;
    let v2 = store.merge(grown).await?.into_inner();
    println!("population {} at {}", v2.population, v2.entity_version());

    let mut stale = v1;
    stale.population = 1;
    if let Err(e) = store.merge(stale).await {
        println!("stale write rejected: {e}");
    }

    println!("content: {}", v2.content()?);
    Ok(())
}
