use super::{SeederModule, ServiceProvider, ServiceScope};
use crate::error::{Error, Result};
use crate::seeder::{Seeder, TaskId};
use crate::store::{FrozenTypedValueStore, ReadStore, StoreValue, TypedValueStore};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Key under which every scope stores its own id.
pub const SCOPE_ID_KEY: &str = "scope_id";

type SeederFactory = Arc<dyn Fn(&ResolveContext<'_>) -> Result<Arc<dyn Seeder>> + Send + Sync>;
type ScopeInit = Arc<dyn Fn(&TypedValueStore<String>) -> Result<()> + Send + Sync>;
type DisposeHook = Arc<dyn Fn(DisposedScope) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// What a factory can see while constructing a seeder.
pub struct ResolveContext<'a> {
    scope_id: Option<u64>,
    shared: &'a FrozenTypedValueStore<String>,
    scoped: Option<&'a TypedValueStore<String>>,
}

impl<'a> ResolveContext<'a> {
    /// Id of the scope being resolved in, `None` at the root.
    pub fn scope_id(&self) -> Option<u64> {
        self.scope_id
    }

    pub fn shared(&self) -> &'a FrozenTypedValueStore<String> {
        self.shared
    }

    pub fn scoped(&self) -> Option<&'a TypedValueStore<String>> {
        self.scoped
    }

    /// Look `key` up in the scope first, then in the shared resources.
    pub fn get<T: StoreValue + Clone>(&self, key: &str) -> Option<T> {
        self.scoped
            .and_then(|scoped| scoped.get::<T, _>(key))
            .or_else(|| self.shared.get::<T, _>(key))
    }

    /// Like [`get`](Self::get), but a missing value is an error.
    pub fn require<T: StoreValue + Clone>(&self, key: &str) -> Result<T> {
        self.get(key).ok_or_else(|| {
            Error::Seed(format!(
                "No '{}' of type {} registered",
                key,
                std::any::type_name::<T>()
            ))
        })
    }
}

/// Passed to dispose hooks when a scope is released.
#[derive(Debug)]
pub struct DisposedScope {
    pub id: u64,
    pub values: FrozenTypedValueStore<String>,
}

struct ContainerInner {
    factories: BTreeMap<TaskId, SeederFactory>,
    shared: FrozenTypedValueStore<String>,
    scope_inits: Vec<ScopeInit>,
    dispose_hooks: Vec<DisposeHook>,
    next_scope_id: AtomicU64,
}

impl ContainerInner {
    fn resolve_with(&self, id: TaskId, ctx: &ResolveContext<'_>) -> Result<Arc<dyn Seeder>> {
        let factory = self
            .factories
            .get(&id)
            .ok_or_else(|| Error::Unresolvable(id.to_string()))?;
        factory(ctx)
    }
}

/// Factory registry for seeders, with shared and scoped resources.
///
/// # Example
///
/// ```
/// # use async_trait::async_trait;
/// # use hostkit::provider::Container;
/// # use hostkit::seeder::Seeder;
/// # use tokio_util::sync::CancellationToken;
/// struct UsersSeeder {
///     admin: String,
/// }
/// # #[async_trait]
/// # impl Seeder for UsersSeeder {
/// #     async fn seed(&self, _ct: &CancellationToken) -> hostkit::Result<()> { Ok(()) }
/// # }
///
/// let container = Container::builder()
///     .value("admin", String::from("root"))
///     .seeder(|ctx| Ok(UsersSeeder { admin: ctx.require::<String>("admin")? }))
///     .build();
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn shared(&self) -> &FrozenTypedValueStore<String> {
        &self.inner.shared
    }

    /// Number of registered seeder factories.
    pub fn len(&self) -> usize {
        self.inner.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.factories.is_empty()
    }
}

#[async_trait]
impl ServiceProvider for Container {
    async fn create_scope(&self) -> Result<Box<dyn ServiceScope>> {
        let id = self.inner.next_scope_id.fetch_add(1, Ordering::Relaxed);
        let values = TypedValueStore::new();
        values.add_or_update(SCOPE_ID_KEY, id);
        for init in &self.inner.scope_inits {
            init(&values)?;
        }
        tracing::trace!(scope = id, "Scope created");

        Ok(Box::new(ContainerScope {
            inner: Arc::clone(&self.inner),
            id,
            values,
            disposed: AtomicBool::new(false),
        }))
    }

    fn resolve(&self, id: TaskId) -> Result<Arc<dyn Seeder>> {
        let ctx = ResolveContext {
            scope_id: None,
            shared: &self.inner.shared,
            scoped: None,
        };
        self.inner.resolve_with(id, &ctx)
    }

    fn can_resolve(&self, id: TaskId) -> bool {
        self.inner.factories.contains_key(&id)
    }
}

impl SeederModule for Container {
    fn seeder_types(&self) -> Vec<TaskId> {
        self.inner.factories.keys().copied().collect()
    }
}

/// A scope opened by a [`Container`].
pub struct ContainerScope {
    inner: Arc<ContainerInner>,
    id: u64,
    values: TypedValueStore<String>,
    disposed: AtomicBool,
}

impl ContainerScope {
    pub fn values(&self) -> &TypedValueStore<String> {
        &self.values
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceScope for ContainerScope {
    fn id(&self) -> u64 {
        self.id
    }

    fn resolve(&self, id: TaskId) -> Result<Arc<dyn Seeder>> {
        if self.is_disposed() {
            return Err(Error::Seed(format!(
                "Scope {} is disposed; cannot resolve '{}'",
                self.id, id
            )));
        }
        let ctx = ResolveContext {
            scope_id: Some(self.id),
            shared: &self.inner.shared,
            scoped: Some(&self.values),
        };
        self.inner.resolve_with(id, &ctx)
    }

    async fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut errors = Vec::new();
        for hook in &self.inner.dispose_hooks {
            let scope = DisposedScope {
                id: self.id,
                values: self.values.to_frozen(),
            };
            if let Err(e) = hook(scope).await {
                errors.push(e);
            }
        }
        self.values.clear();
        tracing::trace!(scope = self.id, "Scope disposed");

        match Error::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Builder for [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    factories: BTreeMap<TaskId, SeederFactory>,
    shared: TypedValueStore<String>,
    scope_inits: Vec<ScopeInit>,
    dispose_hooks: Vec<DisposeHook>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register how to construct seeder `S`. A later registration replaces an earlier one.
    pub fn seeder<S, F>(mut self, factory: F) -> Self
    where
        S: Seeder,
        F: Fn(&ResolveContext<'_>) -> Result<S> + Send + Sync + 'static,
    {
        let factory: SeederFactory = Arc::new(move |ctx: &ResolveContext<'_>| {
            factory(ctx).map(|s| Arc::new(s) as Arc<dyn Seeder>)
        });
        self.factories.insert(TaskId::of::<S>(), factory);
        self
    }

    /// Register a seeder constructed with `Default`.
    pub fn seeder_default<S: Seeder + Default>(self) -> Self {
        self.seeder(|_| Ok(S::default()))
    }

    /// Add a shared resource visible to every resolution.
    pub fn value<T: StoreValue>(self, key: impl Into<String>, value: T) -> Self {
        self.shared.add_or_update(key, value);
        self
    }

    /// Run `init` against every new scope's resources when it is created.
    pub fn scoped<F>(mut self, init: F) -> Self
    where
        F: Fn(&TypedValueStore<String>) -> Result<()> + Send + Sync + 'static,
    {
        self.scope_inits.push(Arc::new(init));
        self
    }

    /// Run `hook` whenever a scope is disposed.
    pub fn on_scope_dispose<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(DisposedScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.dispose_hooks
            .push(Arc::new(move |scope: DisposedScope| hook(scope).boxed()));
        self
    }

    pub fn build(self) -> Container {
        Container {
            inner: Arc::new(ContainerInner {
                factories: self.factories,
                shared: self.shared.to_frozen(),
                scope_inits: self.scope_inits,
                dispose_hooks: self.dispose_hooks,
                next_scope_id: AtomicU64::new(1),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug)]
    struct ScopedSeeder {
        scope_id: Option<u64>,
        greeting: String,
    }

    #[async_trait]
    impl Seeder for ScopedSeeder {
        async fn seed(&self, _ct: &CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    fn container(disposals: Arc<AtomicUsize>) -> Container {
        Container::builder()
            .value("greeting", String::from("hello"))
            .scoped(|values| {
                values.add_or_update("buffer", Vec::<u8>::new());
                Ok(())
            })
            .on_scope_dispose(move |_scope| {
                let disposals = Arc::clone(&disposals);
                async move {
                    disposals.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .seeder(|ctx| {
                Ok(ScopedSeeder {
                    scope_id: ctx.scope_id(),
                    greeting: ctx.require::<String>("greeting")?,
                })
            })
            .build()
    }

    #[test]
    fn test_resolve_from_root() {
        let container = container(Arc::new(AtomicUsize::new(0)));
        assert!(container.can_resolve(TaskId::of::<ScopedSeeder>()));
        assert!(container.resolve(TaskId::of::<ScopedSeeder>()).is_ok());
    }

    #[test]
    fn test_unknown_type_is_unresolvable() {
        let container = Container::builder().build();
        let id = TaskId::of::<ScopedSeeder>();

        assert!(!container.can_resolve(id));
        assert!(matches!(container.resolve(id), Err(Error::Unresolvable(_))));
    }

    #[tokio::test]
    async fn test_scopes_get_distinct_ids_and_values() {
        let container = container(Arc::new(AtomicUsize::new(0)));
        let first = container.create_scope().await.unwrap();
        let second = container.create_scope().await.unwrap();

        assert_ne!(first.id(), second.id());
        assert!(first.resolve(TaskId::of::<ScopedSeeder>()).is_ok());
    }

    #[tokio::test]
    async fn test_resolve_context_prefers_scoped_values() {
        let shared = FrozenTypedValueStore::<String>::empty();
        let scoped = TypedValueStore::<String>::new();
        scoped.add_or_update("greeting", String::from("scoped"));
        let ctx = ResolveContext {
            scope_id: Some(7),
            shared: &shared,
            scoped: Some(&scoped),
        };

        assert_eq!(ctx.get::<String>("greeting").as_deref(), Some("scoped"));
        assert!(ctx.require::<u8>("missing").is_err());

        let seeder = ScopedSeeder {
            scope_id: ctx.scope_id(),
            greeting: ctx.require::<String>("greeting").unwrap(),
        };
        assert_eq!(seeder.scope_id, Some(7));
        assert_eq!(seeder.greeting, "scoped");
    }

    #[tokio::test]
    async fn test_dispose_runs_hooks_once() {
        let disposals = Arc::new(AtomicUsize::new(0));
        let container = container(Arc::clone(&disposals));
        let scope = container.create_scope().await.unwrap();

        scope.dispose().await.unwrap();
        scope.dispose().await.unwrap();

        assert_eq!(disposals.load(Ordering::SeqCst), 1);
        assert!(scope.resolve(TaskId::of::<ScopedSeeder>()).is_err());
    }

    #[tokio::test]
    async fn test_dispose_hook_sees_scope_values() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let container = Container::builder()
            .on_scope_dispose(move |scope| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().push(scope.values.get::<u64, _>(SCOPE_ID_KEY));
                    Ok(())
                }
            })
            .build();

        let scope = container.create_scope().await.unwrap();
        let id = scope.id();
        scope.dispose().await.unwrap();

        assert_eq!(*seen.lock(), vec![Some(id)]);
    }

    #[tokio::test]
    async fn test_failed_scope_init_fails_creation() {
        let container = Container::builder()
            .scoped(|_| Err(Error::Seed("no connection".into())))
            .build();

        assert!(container.create_scope().await.is_err());
    }

    #[test]
    fn test_module_lists_registered_types() {
        let container = container(Arc::new(AtomicUsize::new(0)));
        assert_eq!(container.seeder_types(), vec![TaskId::of::<ScopedSeeder>()]);
        assert_eq!(container.len(), 1);
    }
}
