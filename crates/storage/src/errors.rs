pub(crate) use streamrich_domain::storage::StorageError;
