//! Tracks which dataset a browser session is looking at with a private cookie.

use std::sync::Arc;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    dataset::{DatasetId, DatasetStore},
    finance::FinanceTable,
};

pub(crate) const COOKIE_DATASET_ID: &str = "dataset_id";
/// How long a session remembers its uploaded dataset.
pub(crate) const DATASET_COOKIE_DURATION: Duration = Duration::days(1);

/// Where a session's dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DatasetSource {
    /// The dataset the server was started with.
    Default,
    /// A file uploaded by the visitor.
    Uploaded,
}

/// The dataset a request should be answered with.
#[derive(Debug, Clone)]
pub(crate) struct SessionDataset {
    /// `None` when there is no default dataset and nothing has been uploaded.
    pub table: Option<Arc<FinanceTable>>,
    pub source: DatasetSource,
}

impl SessionDataset {
    pub(crate) fn uploaded(table: Arc<FinanceTable>) -> Self {
        Self {
            table: Some(table),
            source: DatasetSource::Uploaded,
        }
    }

    pub(crate) fn default_from(store: &DatasetStore) -> Self {
        Self {
            table: store.default_table(),
            source: DatasetSource::Default,
        }
    }
}

/// Add a cookie to `jar` pointing the session at the uploaded dataset `id`.
pub(crate) fn set_dataset_cookie(
    jar: PrivateCookieJar,
    id: &DatasetId,
    secure: bool,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_DATASET_ID, id.to_string()))
            .path("/")
            .expires(OffsetDateTime::now_utc() + DATASET_COOKIE_DURATION)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure),
    )
}

/// Set the dataset cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_dataset_cookie(jar: PrivateCookieJar, secure: bool) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_DATASET_ID, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure),
    )
}

/// Find the dataset for the session that sent `jar`.
///
/// Sessions without a dataset cookie get the default dataset. If the cookie
/// refers to a dataset that is no longer stored, e.g., it was evicted or the
/// server restarted, the cookie is invalidated and the default dataset is used.
///
/// # Errors
///
/// Returns [Error::DatasetLockError] if the store's lock is poisoned.
pub(crate) fn get_session_dataset(
    store: &DatasetStore,
    jar: PrivateCookieJar,
    secure: bool,
) -> Result<(SessionDataset, PrivateCookieJar), Error> {
    let Some(cookie) = jar.get(COOKIE_DATASET_ID) else {
        return Ok((SessionDataset::default_from(store), jar));
    };

    let id = DatasetId::new_unchecked(cookie.value().to_owned());

    match store.get(&id)? {
        Some(table) => Ok((SessionDataset::uploaded(table), jar)),
        None => {
            tracing::warn!("Session refers to unknown dataset {id}, using the default dataset");
            Ok((
                SessionDataset::default_from(store),
                invalidate_dataset_cookie(jar, secure),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};

    use crate::{
        dataset::{DatasetId, DatasetStore},
        finance::{FinanceTable, FinancialRecord},
    };

    use super::{COOKIE_DATASET_ID, DatasetSource, get_session_dataset, set_dataset_cookie};

    fn get_test_store() -> DatasetStore {
        DatasetStore::new(
            Some(FinanceTable::new(vec![FinancialRecord::new(
                "DEFAULT", 2000, 1.0, 1.0, 1.0, 1.0,
            )])),
            4,
        )
    }

    fn get_test_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::generate())
    }

    #[test]
    fn no_cookie_uses_default_dataset() {
        let store = get_test_store();

        let (session, _) = get_session_dataset(&store, get_test_jar(), false).unwrap();

        assert_eq!(session.source, DatasetSource::Default);
        assert_eq!(session.table.unwrap().states(), ["DEFAULT"]);
    }

    #[test]
    fn cookie_selects_uploaded_dataset() {
        let store = get_test_store();
        let id = DatasetId::from_contents(b"upload");
        store
            .insert(
                id.clone(),
                FinanceTable::new(vec![FinancialRecord::new(
                    "UPLOADED", 2000, 1.0, 1.0, 1.0, 1.0,
                )]),
            )
            .unwrap();
        let jar = set_dataset_cookie(get_test_jar(), &id, false);

        let (session, jar) = get_session_dataset(&store, jar, false).unwrap();

        assert_eq!(session.source, DatasetSource::Uploaded);
        assert_eq!(session.table.unwrap().states(), ["UPLOADED"]);
        assert_eq!(
            jar.get(COOKIE_DATASET_ID).unwrap().value(),
            id.as_str(),
            "cookie should be kept"
        );
    }

    #[test]
    fn stale_cookie_falls_back_to_default_and_is_invalidated() {
        let store = get_test_store();
        let jar = set_dataset_cookie(get_test_jar(), &DatasetId::from_contents(b"gone"), false);

        let (session, jar) = get_session_dataset(&store, jar, false).unwrap();

        assert_eq!(session.source, DatasetSource::Default);
        assert_eq!(jar.get(COOKIE_DATASET_ID).unwrap().value(), "deleted");
    }
}
