use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use rusqlite::{Connection, params};
use tracing::{debug, info, trace, warn};

use crate::cli::{ExtractArgs, FilterMode};
use crate::model::{
    ContinentSet, DocumentResult, Entity, Metadata, NoteScope, Statistics, SymbolNote, ZoneLegend,
    ZoneRef,
};
use crate::util::{now_utc_string, sha256_hex, similar_files, write_json_pretty, write_json_stdout};

const TABLE_RULE: &str = "_____";
const DELETED_HEADER: &str = "DELETED ENTITIES";
const NOTES_HEADER: &str = "NOTES:";
const DEFAULT_TITLE: &str = "ARRL DXCC List";
const DEFAULT_EDITION: &str = "Unknown Edition";
const CONTINENT_PATTERN: &str = "(?:AF|AN|AS|EU|NA|OC|SA)";

mod assemble;
mod classify;
mod entity_row;
mod footnotes;
mod legend;
mod run;
mod store;

pub use run::run;
pub(crate) use store::{ensure_schema, open_index};

use assemble::*;
use classify::*;
use entity_row::*;
use footnotes::*;
use legend::*;
use store::*;
