use airmozilla_common::{Slug, slugify};
use chrono::NaiveDate;

use crate::domain::repository::{RepositoryError, SuggestionRepository};

#[derive(Debug, thiserror::Error)]
pub enum SlugAllocationError {
    #[error("'{0}' does not produce a valid slug")]
    Invalid(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Picks an unused slug for `candidate`.
///
/// Tries the slugified candidate first, then the candidate dated with `today`
/// (`weekly-sync-20140101`), then the dated form numbered from 2 on
/// (`weekly-sync-20140101-2`, `-3`, ...).
pub async fn allocate<R: SuggestionRepository>(
    repository: &R,
    candidate: &str,
    today: NaiveDate,
) -> Result<Slug, SlugAllocationError> {
    let invalid = || SlugAllocationError::Invalid(candidate.to_string());

    let base = Slug::try_new(slugify(candidate)).map_err(|_| invalid())?;
    if !repository.slug_taken(&base, None).await? {
        return Ok(base);
    }

    let dated = base
        .with_suffix(today.format("%Y%m%d"))
        .map_err(|_| invalid())?;
    if !repository.slug_taken(&dated, None).await? {
        return Ok(dated);
    }

    let mut counter: u32 = 2;
    loop {
        let numbered = dated.with_suffix(counter).map_err(|_| invalid())?;
        if !repository.slug_taken(&numbered, None).await? {
            return Ok(numbered);
        }
        counter += 1;
    }
}
