//! Pull-driven paging for `fetch_all`.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::url::path_placeholders;
use super::{ItemStream, StackExchangeApi};
use crate::types::{FetchOptions, ParamValue, Parameters, Scalar};
use crate::{HuginnError, Result};

type Comparator<T> = Box<dyn FnMut(&T, &T) -> Ordering + Send>;

/// Split `parameters` into one parameter set per request batch.
///
/// No vectored path parameter: a single batch. One: a batch per
/// `page_size` chunk of it (none at all for an empty vector). More than
/// one is an error, there is no sensible way to page two vectors.
fn plan_batches(
    path: &str,
    parameters: &Parameters,
    page_size: usize,
) -> Result<VecDeque<Parameters>> {
    let slots = path_placeholders(path);
    let vectored: Vec<(&str, &[Scalar])> = parameters
        .iter()
        .filter(|(name, _)| slots.contains(name))
        .filter_map(|(name, value)| match value {
            ParamValue::Many(values) => Some((name, values.as_slice())),
            ParamValue::One(_) => None,
        })
        .collect();

    match vectored.as_slice() {
        [] => Ok(VecDeque::from([parameters.clone()])),
        [(name, values)] => Ok(values
            .chunks(page_size)
            .map(|chunk| parameters.clone().with(*name, chunk.to_vec()))
            .collect()),
        many => Err(HuginnError::MultipleBatchParameters(
            many.iter().map(|(name, _)| name.to_string()).collect(),
        )),
    }
}

pub(crate) struct PageCursor<T> {
    api: StackExchangeApi,
    path: String,
    options: FetchOptions,
    batches: VecDeque<Parameters>,
    current: Option<Parameters>,
    page: u32,
    has_more: bool,
    buffer: VecDeque<T>,
    compare: Option<Comparator<T>>,
    deferred_error: Option<HuginnError>,
}

impl<T> PageCursor<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(
        api: StackExchangeApi,
        path: String,
        parameters: Parameters,
        options: FetchOptions,
        compare: Option<Comparator<T>>,
    ) -> Self {
        let page_size = api.effective_page_size(&options);
        let (batches, deferred_error) = match plan_batches(&path, &parameters, page_size) {
            Ok(batches) => (batches, None),
            Err(e) => (VecDeque::new(), Some(e)),
        };
        Self {
            api,
            path,
            options,
            batches,
            current: None,
            page: 0,
            has_more: false,
            buffer: VecDeque::new(),
            compare,
            deferred_error,
        }
    }

    /// Parameters for the next request, or `None` when everything is done.
    fn next_request(&mut self) -> Option<Parameters> {
        if self.has_more {
            self.has_more = false;
            if let Some(current) = &self.current {
                self.page += 1;
                return Some(current.clone().with("page", self.page));
            }
        }
        let batch = self.batches.pop_front()?;
        self.page = 1;
        self.current = Some(batch.clone());
        Some(batch)
    }

    async fn next_item(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if let Some(e) = self.deferred_error.take() {
                return Err(e);
            }
            let Some(request) = self.next_request() else {
                return Ok(None);
            };

            let (mut items, has_more) = self
                .api
                .fetch_page::<T>(&self.path, &request, &self.options)
                .await?;
            debug!(
                path = %self.path,
                page = self.page,
                items = items.len(),
                has_more,
                "fetched page"
            );
            if let Some(compare) = self.compare.as_mut() {
                items.sort_by(|a, b| compare(a, b));
            }
            self.has_more = has_more;
            self.buffer.extend(items);
        }
    }

    pub(crate) fn into_stream(self) -> ItemStream<T> {
        Box::pin(futures_util::stream::try_unfold(
            self,
            |mut cursor| async move {
                let item = cursor.next_item().await?;
                Ok::<_, HuginnError>(item.map(|item| (item, cursor)))
            },
        ))
    }
}
