use reqwest::Client;
use tokio::task::JoinSet;

use crate::config::{HttpOptions, PageErrorPolicy};
use crate::{info_time, warn_time, Error, Result};

/// One HTTP client per job. Keeps the connection pool and cookies between requests.
#[derive(Debug, Clone)]
pub struct Session {
    // Client uses Arc so we can clone cheaply
    client: Client,
}

impl Session {
    pub fn new(opts: &HttpOptions) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if opts.accept_invalid_certs {
            warn_time!("TLS certificate verification is DISABLED for this session");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Requests a page and returns a `Result<String>` containing the HTML.
    /// Any status outside 2xx is an error.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        let html = res.text().await?;
        Ok(html)
    }
}

/// Fetches every `(key, url)` target with at most `concurrency` requests in flight.
///
/// Requests are started in input order and the bodies come back in input order,
/// whatever order they finished in. With `Abort` the first failure cancels the
/// outstanding requests and is returned; with `Skip` the failed target is logged and dropped.
pub async fn fetch_many<K>(
    session: &Session,
    targets: Vec<(K, String)>,
    concurrency: usize,
    on_error: PageErrorPolicy,
) -> Result<Vec<(K, String)>>
where
    K: Send + 'static,
{
    let concurrency = concurrency.max(1);
    let total = targets.len();
    info_time!("Requesting {} pages, {} at a time", total, concurrency);

    let mut task_set = JoinSet::new();
    let mut pages = Vec::with_capacity(total);

    for (pos, (key, url)) in targets.into_iter().enumerate() {
        while task_set.len() >= concurrency {
            if let Some(task) = task_set.join_next().await {
                collect_page(task?, &mut pages, &mut task_set, on_error)?;
            }
        }
        task_set.spawn({
            let session = session.clone();
            async move {
                let res = session.get_text(&url).await;
                (pos, key, url, res)
            }
        });
    }
    while let Some(task) = task_set.join_next().await {
        collect_page(task?, &mut pages, &mut task_set, on_error)?;
    }

    pages.sort_unstable_by_key(|(pos, _, _)| *pos);
    info_time!("Fetched {} of {} pages", pages.len(), total);
    Ok(pages.into_iter().map(|(_, key, body)| (key, body)).collect())
}

type Fetched<K> = (usize, K, String, Result<String>);

fn collect_page<K>(
    fetched: Fetched<K>,
    pages: &mut Vec<(usize, K, String)>,
    task_set: &mut JoinSet<Fetched<K>>,
    on_error: PageErrorPolicy,
) -> Result<()>
where
    K: Send + 'static,
{
    let (pos, key, url, res) = fetched;
    match res {
        Ok(body) => {
            pages.push((pos, key, body));
            Ok(())
        }
        Err(e) => match on_error {
            PageErrorPolicy::Abort => {
                task_set.abort_all();
                Err(e)
            }
            PageErrorPolicy::Skip => {
                warn_time!("skipping {}: {}", url, e);
                Ok(())
            }
        },
    }
}
