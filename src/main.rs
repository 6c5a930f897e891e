//! Prints the sorted-search submission a predicate turns into, without
//! talking to a cluster.
//!
//! ```text
//! hyperclient [--config FILE] <space> <predicate-json> <sort-by> <limit> [asc|desc]
//! ```

use std::ops::Bound;
use std::path::PathBuf;
use std::process::ExitCode;

use serde_json::{Value as Json, json};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hyperclient::config::ClientConfig;
use hyperclient::datatype::{Limit, Value};
use hyperclient::transport::{ResultSlots, SearchCall, SortedSearchCall, Transport};
use hyperclient::{Client, ClientError};

const USAGE: &str = "usage: hyperclient [--config FILE] <space> <predicate-json> <sort-by> <limit> [asc|desc]";

/// Accepts every submission and keeps a JSON rendering of the last one.
#[derive(Default)]
struct ExplainTransport {
    next_id: i64,
    last: Option<Json>,
}

impl Transport for ExplainTransport {
    fn sorted_search(&mut self, call: &SortedSearchCall<'_>, _slots: &ResultSlots) -> i64 {
        self.last = Some(json!({
            "space": call.space,
            "equalities": call.equalities.iter().map(|c| json!({
                "attribute": c.attribute(),
                "value": c.value().to_json(),
            })).collect::<Vec<_>>(),
            "ranges": call.ranges.iter().map(|c| json!({
                "attribute": c.attribute(),
                "lower": bound_to_json(c.lower()),
                "upper": bound_to_json(c.upper()),
            })).collect::<Vec<_>>(),
            "sort_by": call.sort_by,
            "limit": call.limit.to_string(),
            "descending": call.descending,
        }));
        self.next_id += 1;
        self.next_id
    }
    fn search(&mut self, call: &SearchCall<'_>, _slots: &ResultSlots) -> i64 {
        self.last = Some(json!({
            "space": call.space,
            "equalities": call.equalities.len(),
            "ranges": call.ranges.len(),
        }));
        self.next_id += 1;
        self.next_id
    }
}

fn bound_to_json(bound: &Bound<Value>) -> Json {
    match bound {
        Bound::Included(v) => json!({ "included": v.to_json() }),
        Bound::Excluded(v) => json!({ "excluded": v.to_json() }),
        Bound::Unbounded => Json::Null,
    }
}

fn run(args: Vec<String>) -> hyperclient::Result<Json> {
    let mut args = args.into_iter().peekable();
    let mut config_path = None;
    if args.peek().map(String::as_str) == Some("--config") {
        args.next();
        config_path = Some(PathBuf::from(
            args.next().ok_or_else(|| ClientError::Config("--config needs a path".into()))?,
        ));
    }
    let config = ClientConfig::load(config_path.as_deref())?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let positional: Vec<String> = args.collect();
    let [space, predicate, sort_by, limit, rest @ ..] = positional.as_slice() else {
        return Err(ClientError::Value(USAGE.into()));
    };
    let descending = match rest {
        [] => false,
        [order] if order == "asc" => false,
        [order] if order == "desc" => true,
        _ => return Err(ClientError::Value(USAGE.into())),
    };
    let predicate: Json = serde_json::from_str(predicate)
        .map_err(|e| ClientError::Value(format!("predicate is not valid JSON: {}", e)))?;
    let limit: Limit = limit.parse()?;

    let client = Client::new(ExplainTransport::default(), config);
    let op = client.sorted_search_json(space, &predicate, sort_by, limit, descending)?;
    info!(id = %op.id(), "search accepted");
    client.complete(op.id())?;

    Ok(client.with_transport(|t| t.last.clone())?.unwrap_or(Json::Null))
}

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(rendered) => {
            println!("{}", serde_json::to_string_pretty(&rendered).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
