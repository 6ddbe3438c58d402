//! Parallel mapping of line windows
//!
//! Lines are read on the caller thread into a window and mapped on the
//! parser's rayon pool. A line is always tokenized and converted by a single
//! worker. With `keep_order` the window comes back in source order; without it
//! results are collected in completion order through a channel.

use std::borrow::Cow;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::Result;
use crate::mapping::MappingResult;
use crate::parser::CsvParser;

/// One numbered line awaiting a worker
pub(crate) type WindowLine<'a> = (usize, Cow<'a, str>);

/// Dedicated worker pool for one parser
pub(crate) fn build_pool(degree: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(degree)
        .thread_name(|index| format!("csvmap-worker-{}", index))
        .build()?;
    debug!("Started mapping pool with {} workers", degree);
    Ok(pool)
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(|token| token.is_cancelled())
}

/// Map every line of `window`, skipping lines not yet started when `cancel` fires
pub(crate) fn map_window<T>(
    parser: &CsvParser<T>,
    pool: &ThreadPool,
    window: &[WindowLine<'_>],
    keep_order: bool,
    cancel: Option<&CancellationToken>,
) -> Vec<MappingResult<T>>
where
    T: Default + Send + 'static,
{
    if keep_order {
        return pool.install(|| {
            window
                .par_iter()
                .filter_map(|(number, line)| {
                    if is_cancelled(cancel) {
                        return None;
                    }
                    Some(parser.parse_line(line, *number))
                })
                .collect()
        });
    }

    let (sender, receiver) = crossbeam_channel::unbounded();
    pool.install(|| {
        window
            .par_iter()
            .for_each_with(sender, |sender, (number, line)| {
                if is_cancelled(cancel) {
                    return;
                }
                // The receiver outlives every sender
                let _ = sender.send(parser.parse_line(line, *number));
            });
    });
    receiver.into_iter().collect()
}
