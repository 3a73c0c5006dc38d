// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::unnecessary_map_or)]

//! # Canvas Oxide
//!
//! Layout reconciliation and zone mapping for business-model canvases and
//! other multi-field visual templates.
//!
//! ## Core Features
//!
//! - **Coordinate normalization**: per-document calibration from an
//!   extraction engine's space into a template's canonical space
//!   ([`geometry::CanvasTransform`]), plus ray-casting polygon membership.
//! - **Zone mapping**: centroid-in-polygon assignment of extracted blocks to
//!   the named zones of a template, with per-zone counts ([`zones`]).
//! - **Spatial reconciliation**: back-fill bounding boxes onto text records
//!   held by an external store, by token-overlap matching against a fresh
//!   extraction of the same file ([`reconcile`]).
//! - **Frame auto-assignment**: heading-driven filling of form fields with
//!   traceable evidence ([`frames`]).
//!
//! Extraction engines, the text store, template storage and source-file
//! lookup are collaborators behind traits ([`extract::Extractor`],
//! [`reconcile::TextStore`], [`zones::TemplateStore`],
//! [`reconcile::SourceResolver`]).
//!
//! ## Quick Start
//!
//! ```
//! use canvas_oxide::geometry::BBox;
//! use canvas_oxide::layout::{observe_page_dims, Block, BlockRole};
//! use canvas_oxide::zones::{map_to_zones, Template, Zone};
//! use canvas_oxide::frames::{auto_assign, find_frame};
//!
//! let blocks = vec![
//!     Block::new(0, 0, BBox::new(0.0, 0.0, 400.0, 40.0))
//!         .with_role(BlockRole::Heading)
//!         .with_text("Mission"),
//!     Block::new(1, 0, BBox::new(0.0, 50.0, 400.0, 90.0)).with_text("connect growers with buyers"),
//!     Block::new(2, 0, BBox::new(600.0, 700.0, 1000.0, 1000.0)).with_text("TAM: 5 BN"),
//! ];
//!
//! let template = Template::new("halves")
//!     .with_zone(Zone::rect("mission", BBox::new(0.0, 0.0, 1.0, 0.5)))
//!     .with_zone(Zone::rect("tam", BBox::new(0.0, 0.5, 1.0, 1.0)));
//! let mapping = map_to_zones(&blocks, &observe_page_dims(&blocks), &template);
//! assert_eq!(mapping.counts["mission"], 2);
//! assert_eq!(mapping.counts["tam"], 1);
//!
//! let pbm = find_frame("platform-business-model").unwrap();
//! let fields = auto_assign(&pbm, &blocks);
//! let mission = fields.iter().find(|f| f.name == "Mission").unwrap();
//! assert_eq!(mission.value.as_deref(), Some("connect growers with buyers"));
//! ```

#![warn(missing_docs)]

pub mod error;

pub mod config;

pub mod geometry;
pub mod layout;
pub mod text;

pub mod extract;

pub mod zones;

pub mod frames;

pub mod reconcile;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use geometry::{BBox, CanvasTransform, Point, Polygon};
pub use layout::{Block, BlockRole};
