use std::{path::PathBuf, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::error::{Error, UploadError};

/// Tracks output paths with a write in flight so concurrent requests cannot
/// clobber each other's files.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProcessMap {
    map: Arc<DashMap<PathBuf, ()>>,
}

impl ProcessMap {
    pub(crate) fn claim(&self, path: PathBuf) -> Result<ClaimGuard, Error> {
        match self.map.entry(path) {
            Entry::Vacant(vacant) => {
                let key = vacant.key().clone();

                vacant.insert(());

                Ok(ClaimGuard {
                    map: Arc::clone(&self.map),
                    key,
                })
            }
            Entry::Occupied(_) => Err(UploadError::AlreadyClaimed.into()),
        }
    }
}

pub(crate) struct ClaimGuard {
    map: Arc<DashMap<PathBuf, ()>>,
    key: PathBuf,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::ProcessMap;

    #[test]
    fn double_claim_is_rejected() {
        let map = ProcessMap::default();
        let path = PathBuf::from("outgoing/video.avi");

        let guard = map.claim(path.clone()).unwrap();

        assert!(map.claim(path.clone()).is_err());

        drop(guard);

        assert!(map.claim(path).is_ok());
    }

    #[test]
    fn distinct_paths_claim_independently() {
        let map = ProcessMap::default();

        let _a = map.claim(PathBuf::from("outgoing/a.avi")).unwrap();
        let _b = map.claim(PathBuf::from("outgoing/b.avi")).unwrap();
    }
}
