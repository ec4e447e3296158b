/*!
# Payroll Dashboard

A small browser dashboard that summarizes an uploaded payroll workbook, built in Rust.

## Overview

The user uploads an `.xlsx` file through a single form. The server loads the first
sheet and checks that the expected columns are there. It then derives net pay,
groups and sums by a category, computes a few headline metrics, draws a bar chart
and returns everything on one HTML page.

## Architecture

One request, one linear pipeline:

- **Upload receiver** - Extracts the workbook from the multipart form (`upload`)
- **Table loader** - Reads the first sheet into a `PayrollTable` (`loader`)
- **Validator** - Checks for the required columns (`validate`)
- **Transformer** - Derives net pay, parses dates, groups and sums (`transform`)
- **Metrics calculator** - Average, total, per-category counts, pay period (`metrics`)
- **Chart renderer** - Headless plotters bar chart, PNG, base64 (`chart`)
- **Page renderer** - Handlebars template with inline results or error (`render`)

Any failure stops the pipeline and the page shows the error message in place of
results. The HTTP status is always 200.

## Profiles

Column layouts are described by a `PipelineConfig`. Two are built in:

- `department` - requires `Department` and `Net Pay`, sums net pay per department
- `worker` - requires `Worker Type`, `Gross Pay`, `Taxes` and `Pay Date`, derives
  `Net Pay` and reports summary metrics

## Modules

- **table**: Cell values and the loaded table
- **loader**: Workbook parsing with calamine
- **validate**: Required-column checks
- **transform**: Net pay, date parsing, grouped sums
- **metrics**: Summary statistics over the full table
- **pipeline**: The stages wired together
- **chart**: Bar chart rendering (web feature)
- **render**: HTML page rendering (web feature)
- **upload**: Multipart upload handling (web feature)
- **app**: Routing and server startup (web feature)
*/

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod table;
pub mod transform;
pub mod upload;
pub mod validate;

pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use table::*;
