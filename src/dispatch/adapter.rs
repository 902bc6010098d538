//! Turns a blob into the input shape a pipeline asks for.

use tracing::{debug, warn};

use crate::clients::gbx_parser::{ContainerParser, ParseMode};
use crate::core::data::{GenericContainer, RawBlob};
use crate::core::error::{DispatchError, ParseError};
use crate::core::tool::AdaptedInput;
use crate::dispatch::pipeline::Strategy;
use crate::domain::Gbx;

#[derive(Debug)]
pub enum Outcome {
    Adapted(AdaptedInput),
    /// No in-place adaptation; the blob should be walked as an archive.
    Expand(RawBlob),
    /// The unit yields nothing. Any diagnostic was already logged.
    NoMatch,
}

enum Step {
    Done(AdaptedInput),
    Next(RawBlob),
    Stop,
}

/// Parses `bytes` as a container. `Ok(None)` means the signature did not match.
pub async fn adapt_container(
    parser: &dyn ContainerParser,
    path: Option<&str>,
    bytes: &[u8],
    header_only: bool,
) -> Result<Option<Gbx>, ParseError> {
    parser
        .parse(path, bytes, ParseMode::from_header_only(header_only))
        .await
}

/// Runs `strategies` over one blob. Parse failures are fatal and carry the blob name.
pub async fn adapt_unit(
    parser: &dyn ContainerParser,
    strategies: &[Strategy],
    blob: RawBlob,
) -> Result<Outcome, DispatchError> {
    let mut blob = blob;
    for strategy in strategies {
        let step = match *strategy {
            Strategy::ExpandArchive => return Ok(Outcome::Expand(blob)),
            Strategy::PassRaw => Step::Done(AdaptedInput::Raw(blob)),
            Strategy::DecodeText => Step::Done(AdaptedInput::Text(blob.to_text())),
            Strategy::WrapContainer => wrap(blob),
            Strategy::ParseContainer { header_only } => parse(parser, blob, header_only).await?,
        };
        match step {
            Step::Done(input) => return Ok(Outcome::Adapted(input)),
            Step::Next(rest) => blob = rest,
            Step::Stop => return Ok(Outcome::NoMatch),
        }
    }
    Ok(Outcome::NoMatch)
}

fn wrap(blob: RawBlob) -> Step {
    match GenericContainer::from_blob(blob) {
        Ok(container) => Step::Done(AdaptedInput::Generic(container)),
        Err(blob) if blob.len() < crate::dispatch::sniff::MIN_CONTAINER_LEN => {
            warn!(
                unit = blob.name().unwrap_or("<unnamed>"),
                "invalid GBX data, too short"
            );
            Step::Stop
        }
        Err(blob) => Step::Next(blob),
    }
}

async fn parse(
    parser: &dyn ContainerParser,
    blob: RawBlob,
    header_only: bool,
) -> Result<Step, DispatchError> {
    let parsed = adapt_container(parser, blob.name(), blob.data(), header_only)
        .await
        .map_err(|source| DispatchError::Parse {
            path: blob.name().map(str::to_owned),
            source,
        })?;
    match parsed {
        Some(gbx) => Ok(Step::Done(AdaptedInput::Typed(gbx))),
        None => {
            debug!(unit = blob.name().unwrap_or("<unnamed>"), "no container signature");
            Ok(Step::Next(blob))
        }
    }
}
