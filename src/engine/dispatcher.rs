use futures::future::join_all;

use crate::client::{EnrichError, Enricher};
use crate::models::{Outcome, Record};

/// Enriches every record of a batch concurrently and pairs each record with its result.
///
/// All calls are awaited to completion before returning, so a slow or failing record never
/// cancels its neighbours, and the outcomes come back in batch order whatever order the calls
/// finished in. If any call hits a fatal error the whole batch fails with the first one in batch
/// order.
pub async fn dispatch<E: Enricher>(enricher: &E, batch: Vec<Record>) -> Result<Vec<Outcome>, EnrichError> {
    let settled = join_all(batch.iter().map(|record| enricher.enrich(record))).await;
    let mut outcomes = Vec::with_capacity(batch.len());

    for (record, result) in batch.into_iter().zip(settled) {
        outcomes.push(Outcome {
            record,
            enrichment: result?
        });
    }

    Ok(outcomes)
}
