use r01f_application::{
    CrudService, CrudServiceRegistry, ModelObjectCrudService, UserContext, rest,
};
use r01f_domain::{
    config::PersistenceConfig,
    model_object::ModelObject,
    persist::{CrudResult, InMemoryModelObjectStore},
    specification::FnSpecification,
    validation::RuleSetValidator,
};
use r01f_macros::{model_object, oid};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 配置文件路径（可选）
const ENV_CONFIG: &str = "R01F_CONFIG";

#[oid]
struct OrderOid(uuid::Uuid);

#[model_object(oid = OrderOid, tag = "order")]
#[derive(Clone)]
struct Order {
    customer: String,
    total_cents: u64,
}

#[oid]
struct ProductOid(String);

#[model_object(oid = ProductOid, tag = "product")]
#[derive(Clone)]
struct Product {
    name: String,
    stock: u32,
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("demo=info,r01f_application=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn load_config() -> anyhow::Result<PersistenceConfig> {
    let config = match std::env::var(ENV_CONFIG) {
        Ok(path) => {
            info!(path = %path, "loading persistence config");
            PersistenceConfig::from_file(path)?
        }
        Err(_) => PersistenceConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn report<M: ModelObject>(step: &str, result: &CrudResult<M>) {
    let status = rest::status_of(result);
    match result {
        CrudResult::Ok(ok) => info!(
            step,
            status,
            requested = %ok.requested(),
            performed = %ok.performed(),
            oid = %ok.model_object().oid_text(),
            version = %ok.model_object().entity_version(),
            "done"
        ),
        CrudResult::Err(err) => warn!(step, status, error = %err, "rejected"),
    }
}

fn report_json(step: &str, result: &CrudResult<Value>) {
    let status = rest::status_of(result);
    match result {
        CrudResult::Ok(ok) => info!(
            step,
            status,
            performed = %ok.performed(),
            body = %ok.model_object(),
            "done"
        ),
        CrudResult::Err(err) => warn!(step, status, error = %err, "rejected"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let config = load_config()?;
    info!(?config, "starting");

    let orders: Arc<dyn CrudService<Order>> = Arc::new(
        ModelObjectCrudService::new(InMemoryModelObjectStore::<Order>::new(), config.clone())
            .with_validator(RuleSetValidator::new().rule(
                "customer",
                "customer is required",
                FnSpecification::new(|o: &Order| !o.customer.trim().is_empty()),
            )),
    );
    let products: Arc<dyn CrudService<Product>> = Arc::new(ModelObjectCrudService::new(
        InMemoryModelObjectStore::<Product>::new(),
        config,
    ));

    let registry = CrudServiceRegistry::new();
    registry.register(orders.clone())?;
    registry.register(products)?;
    info!(tags = ?registry.registered_tags(), "services registered");

    let ctx = UserContext::builder()
        .user_code("demo")
        .correlation_id(uuid::Uuid::new_v4().to_string())
        .build();

    // 强类型调用
    let created = orders
        .create(
            &ctx,
            Order {
                customer: "ACME".into(),
                total_cents: 12_50,
                ..Default::default()
            },
        )
        .await?;
    report("create order", &created);

    if let CrudResult::Ok(ok) = created {
        let stored = ok.into_model_object();
        report("update unchanged", &orders.update(&ctx, stored.clone()).await?);

        let mut changed = stored.clone();
        changed.total_cents = 20_00;
        report("update changed", &orders.update(&ctx, changed).await?);
        report("update stale", &orders.update(&ctx, stored.clone()).await?);

        if let Some(oid) = stored.oid() {
            report("delete order", &orders.delete(&ctx, oid).await?);
            report("load deleted", &orders.load(&ctx, oid).await?);
        }
    }

    report(
        "create invalid order",
        &orders.create(&ctx, Order::default()).await?,
    );

    // 按标签以 JSON 调度
    let saved = registry
        .save_json(
            "product",
            &ctx,
            json!({ "oid": "sku-1", "name": "pencil", "stock": 10 }),
        )
        .await?;
    report_json("save product json", &saved);
    report_json(
        "save duplicate product json",
        &registry
            .save_json("product", &ctx, json!({ "oid": "sku-1", "name": "pen" }))
            .await?,
    );
    report_json(
        "load product json",
        &registry.load_json("product", &ctx, "sku-1").await?,
    );

    let (status, body) = rest::to_response(&saved)?;
    info!(status, body = %body, "rest response");

    Ok(())
}
