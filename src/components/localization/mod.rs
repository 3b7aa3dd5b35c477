use fluent::concurrent::FluentBundle;
use fluent::{FluentArgs, FluentResource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

#[derive(Debug, thiserror::Error)]
pub enum L10nError {
    #[error("invalid language identifier: {0}")]
    Language(#[from] unic_langid::LanguageIdentifierError),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid FTL resource: {0}")]
    Resource(String),
}

#[derive(Clone)]
pub struct L10n {
    bundle: Arc<FluentBundle<FluentResource>>,
}

impl L10n {
    /// Reads `<dir>/<lang>.ftl`.
    pub fn load(dir: impl AsRef<Path>, lang_id_string: &str) -> Result<Self, L10nError> {
        let path = dir.as_ref().join(format!("{lang_id_string}.ftl"));
        let ftl_string = std::fs::read_to_string(&path)
            .map_err(|source| L10nError::Read { path, source })?;
        Self::from_ftl(lang_id_string, ftl_string)
    }

    pub fn from_ftl(lang_id_string: &str, ftl_string: String) -> Result<Self, L10nError> {
        let lang_id: LanguageIdentifier = lang_id_string.parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        bundle.set_use_isolating(false);
        let res = FluentResource::try_new(ftl_string)
            .map_err(|(_, errors)| L10nError::Resource(format!("{errors:?}")))?;
        bundle
            .add_resource(res)
            .map_err(|errors| L10nError::Resource(format!("{errors:?}")))?;
        Ok(Self {
            bundle: Arc::new(bundle),
        })
    }

    /// Missing messages render as their id.
    pub fn string(&self, msg_id: &str, args: FluentArgs) -> String {
        let Some(pattern) = self
            .bundle
            .get_message(msg_id)
            .and_then(|msg| msg.value())
        else {
            warn!("Localized message {} is missing.", msg_id);
            return msg_id.to_string();
        };
        let mut errors = vec![];
        let value = self
            .bundle
            .format_pattern(pattern, Some(&args), &mut errors);
        if !errors.is_empty() {
            warn!("Localized message {} has errors: {:?}", msg_id, errors);
        }
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FTL: &str = "greeting = Hello, { $name }!\nplain = Plain text\n";

    #[test]
    fn formats_messages_with_args() {
        let l10n = L10n::from_ftl("en-US", FTL.to_string()).unwrap();
        assert_eq!(
            l10n.string("greeting", fluent_args!["name" => "Ann"]),
            "Hello, Ann!"
        );
        assert_eq!(l10n.string("plain", fluent_args![]), "Plain text");
    }

    #[test]
    fn missing_message_falls_back_to_id() {
        let l10n = L10n::from_ftl("en-US", FTL.to_string()).unwrap();
        assert_eq!(l10n.string("nope", fluent_args![]), "nope");
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en-US.ftl"), FTL).unwrap();
        let l10n = L10n::load(dir.path(), "en-US").unwrap();
        assert_eq!(l10n.string("plain", fluent_args![]), "Plain text");
        assert!(matches!(
            L10n::load(dir.path(), "ru-RU"),
            Err(L10nError::Read { .. })
        ));
    }
}
