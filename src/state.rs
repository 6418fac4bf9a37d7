use crate::{config::Configuration, process_map::ProcessMap, store::FileStore};

#[derive(Clone)]
pub(crate) struct State {
    pub(super) config: Configuration,
    pub(super) store: FileStore,
    pub(super) process_map: ProcessMap,
}
