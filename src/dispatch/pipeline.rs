//! Static mapping from a tool capability to the adaptation steps tried on a blob.

use crate::core::tool::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    RawBytes,
    Text,
    GenericContainer,
    TypedContainer { header_only: bool },
}

/// One adaptation step. Steps run in order until one produces an input or stops the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PassRaw,
    DecodeText,
    /// Signature check only, no parse.
    WrapContainer,
    ParseContainer { header_only: bool },
    /// Hand the blob to the archive walker and adapt each entry.
    ExpandArchive,
}

pub fn select_pipeline(capability: Capability) -> PipelineKind {
    match capability {
        Capability::RawBytes => PipelineKind::RawBytes,
        Capability::Text => PipelineKind::Text,
        Capability::GenericContainer => PipelineKind::GenericContainer,
        Capability::TypedContainer { header_only, .. } => {
            PipelineKind::TypedContainer { header_only }
        }
    }
}

impl PipelineKind {
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            PipelineKind::RawBytes => &[Strategy::PassRaw],
            PipelineKind::Text => &[Strategy::DecodeText],
            PipelineKind::GenericContainer => &[Strategy::WrapContainer, Strategy::ExpandArchive],
            PipelineKind::TypedContainer { header_only: true } => &[
                Strategy::ParseContainer { header_only: true },
                Strategy::ExpandArchive,
            ],
            PipelineKind::TypedContainer { header_only: false } => &[
                Strategy::ParseContainer { header_only: false },
                Strategy::ExpandArchive,
            ],
        }
    }

    /// Steps applied to each archive entry. Archives never nest.
    pub fn entry_strategies(self) -> &'static [Strategy] {
        let all = self.strategies();
        match all.split_last() {
            Some((Strategy::ExpandArchive, rest)) => rest,
            _ => all,
        }
    }

    pub fn expands_archives(self) -> bool {
        self.strategies().contains(&Strategy::ExpandArchive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Schema;

    #[test]
    fn byte_and_text_pipelines_never_touch_archives() {
        assert!(!PipelineKind::RawBytes.expands_archives());
        assert!(!PipelineKind::Text.expands_archives());
        assert_eq!(PipelineKind::Text.strategies(), &[Strategy::DecodeText]);
    }

    #[test]
    fn container_pipelines_fall_back_to_archives() {
        let typed = select_pipeline(Capability::TypedContainer {
            schema: Schema::Map,
            header_only: true,
        });
        assert_eq!(typed, PipelineKind::TypedContainer { header_only: true });
        assert!(typed.expands_archives());
        assert_eq!(
            typed.entry_strategies(),
            &[Strategy::ParseContainer { header_only: true }]
        );
        assert_eq!(
            PipelineKind::GenericContainer.entry_strategies(),
            &[Strategy::WrapContainer]
        );
    }
}
