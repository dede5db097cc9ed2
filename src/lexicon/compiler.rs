use crate::db::repositories::LexiconRepository;
use crate::error::AppError;
use crate::models::lexicon::CompiledLexicon;

/// Reads every active row for a lexicon id in one query and compiles them into the
/// sorted, longest-match-first view. Never partially updated: a caller either gets a
/// full rebuild or an error, never a compiled view reflecting a subset of active rows.
pub async fn compile(repository: &LexiconRepository, lexicon_id: &str) -> Result<CompiledLexicon, AppError> {
    let terms = repository.list_active(lexicon_id).await?;
    Ok(CompiledLexicon::from_active_terms(lexicon_id, terms))
}
