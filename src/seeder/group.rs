use super::{Seeder, TaskId};
use crate::error::{Error, Result};
use std::sync::Arc;

/// One member of a [`SeederGroup`].
#[derive(Clone)]
pub enum SeederEntry {
    /// A seeder type, resolved at execution time inside its own scope.
    Type(TaskId),
    /// A prebuilt seeder instance. Runs without a scope of its own.
    Instance(Arc<dyn Seeder>),
}

impl SeederEntry {
    pub fn task_id(&self) -> TaskId {
        match self {
            SeederEntry::Type(id) => *id,
            SeederEntry::Instance(seeder) => seeder.task_id(),
        }
    }

    /// Whether `other` names the same member: the same type for type entries,
    /// the same allocation for instance entries.
    fn is_same(&self, other: &SeederEntry) -> bool {
        match (self, other) {
            (SeederEntry::Type(a), SeederEntry::Type(b)) => a == b,
            (SeederEntry::Instance(a), SeederEntry::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for SeederEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeederEntry::Type(id) => f.debug_tuple("Type").field(id).finish(),
            SeederEntry::Instance(seeder) => {
                f.debug_tuple("Instance").field(&seeder.task_id()).finish()
            }
        }
    }
}

/// Seeders that run concurrently with each other.
///
/// Members keep their insertion order. A member may appear only once per
/// group; adding it again fails with [`Error::DuplicateSeeder`] and leaves the
/// group unchanged.
///
/// ```
/// # use async_trait::async_trait;
/// # use hostkit::seeder::{Seeder, SeederGroup};
/// # use tokio_util::sync::CancellationToken;
/// # struct Schema;
/// # struct Roles;
/// # #[async_trait] impl Seeder for Schema { async fn seed(&self, _: &CancellationToken) -> hostkit::Result<()> { Ok(()) } }
/// # #[async_trait] impl Seeder for Roles { async fn seed(&self, _: &CancellationToken) -> hostkit::Result<()> { Ok(()) } }
/// # fn example() -> hostkit::Result<()> {
/// let mut group = SeederGroup::new();
/// group.add_seeder::<Schema>()?.add_seeder::<Roles>()?;
/// assert_eq!(group.len(), 2);
/// assert!(group.add_seeder::<Roles>().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default, Debug)]
pub struct SeederGroup {
    entries: Vec<SeederEntry>,
}

impl SeederGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an instance group from prebuilt seeders.
    pub fn from_instances<I>(seeders: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Seeder>>,
    {
        let mut group = Self::new();
        for seeder in seeders {
            group.add_instance(seeder)?;
        }
        Ok(group)
    }

    /// Add the seeder type `T`, resolved at execution time.
    pub fn add_seeder<T: Seeder>(&mut self) -> Result<&mut Self> {
        self.add_type(TaskId::of::<T>())
    }

    pub fn add_type(&mut self, id: TaskId) -> Result<&mut Self> {
        self.push(SeederEntry::Type(id))
    }

    /// Add a prebuilt seeder. Instances are compared by reference.
    pub fn add_instance(&mut self, seeder: Arc<dyn Seeder>) -> Result<&mut Self> {
        self.push(SeederEntry::Instance(seeder))
    }

    pub fn add_instance_of<T: Seeder>(&mut self, seeder: T) -> Result<&mut Self> {
        self.add_instance(Arc::new(seeder))
    }

    fn push(&mut self, entry: SeederEntry) -> Result<&mut Self> {
        if self.entries.iter().any(|existing| existing.is_same(&entry)) {
            return Err(Error::DuplicateSeeder(entry.task_id().to_string()));
        }
        self.entries.push(entry);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether a type entry for `id` is present.
    pub fn contains(&self, id: TaskId) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, SeederEntry::Type(existing) if *existing == id))
    }

    /// Identities of all members, in insertion order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.entries.iter().map(SeederEntry::task_id).collect()
    }

    pub fn entries(&self) -> &[SeederEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SeederEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Alpha;
    struct Beta;

    #[async_trait]
    impl Seeder for Alpha {
        async fn seed(&self, _ct: &CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Seeder for Beta {
        async fn seed(&self, _ct: &CancellationToken) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_new_group_is_empty() {
        let group = SeederGroup::new();
        assert!(group.is_empty());
        assert_eq!(group.len(), 0);
    }

    #[test]
    fn test_add_seeder_records_type() {
        let mut group = SeederGroup::new();
        group.add_seeder::<Alpha>().unwrap();

        assert_eq!(group.len(), 1);
        assert!(group.contains(TaskId::of::<Alpha>()));
        assert!(!group.contains(TaskId::of::<Beta>()));
    }

    #[test]
    fn test_duplicate_type_is_rejected_immediately() {
        let mut group = SeederGroup::new();
        group.add_seeder::<Alpha>().unwrap();

        let err = group.add_seeder::<Alpha>().unwrap_err();

        assert!(matches!(err, Error::DuplicateSeeder(ref name) if name.ends_with("Alpha")));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_chained_additions_keep_order() {
        let mut group = SeederGroup::new();
        group
            .add_seeder::<Beta>()
            .and_then(|g| g.add_seeder::<Alpha>())
            .unwrap();

        assert_eq!(
            group.task_ids(),
            vec![TaskId::of::<Beta>(), TaskId::of::<Alpha>()]
        );
    }

    #[test]
    fn test_same_instance_is_rejected() {
        let seeder: Arc<dyn Seeder> = Arc::new(Alpha);
        let mut group = SeederGroup::new();
        group.add_instance(Arc::clone(&seeder)).unwrap();

        assert!(group.add_instance(seeder).is_err());
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_distinct_instances_of_one_type_are_allowed() {
        let mut group = SeederGroup::new();
        group.add_instance_of(Alpha).unwrap();
        group.add_instance_of(Alpha).unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(group.task_ids(), vec![TaskId::of::<Alpha>(); 2]);
    }

    #[test]
    fn test_from_instances_rejects_repeated_reference() {
        let seeder: Arc<dyn Seeder> = Arc::new(Beta);
        let result = SeederGroup::from_instances(vec![Arc::clone(&seeder), seeder]);
        assert!(matches!(result, Err(Error::DuplicateSeeder(_))));
    }
}
