//! Cancellation lifecycle: requested, then confirmed.

use crate::error::UsageError;
use crate::types::{BookingId, CancellationId, RefundInformation, RefundStatus};
use crate::{Client, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancellationRecord {
    id: CancellationId,
    refund_information: RefundInformation,
}

/// Where a [`Cancellation`] is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CancellationState {
    /// Nothing sent yet.
    NotRequested,
    /// Requested; the refund is a quote until confirmed.
    Requested {
        id: CancellationId,
        refund: RefundInformation,
    },
    /// Confirmed. Terminal.
    Confirmed {
        id: CancellationId,
        refund: RefundInformation,
    },
}

/// The cancellation of a booking.
///
/// Obtained from [`Client::request_cancellation`], which already performed
/// the request step.
pub struct Cancellation {
    client: Client,
    booking: BookingId,
    state: CancellationState,
}

impl Cancellation {
    pub(crate) fn new(client: Client, booking: BookingId) -> Self {
        Self {
            client,
            booking,
            state: CancellationState::NotRequested,
        }
    }

    /// Requests the cancellation, or requests it again for a fresh refund
    /// quote. Returns the refund information.
    ///
    /// # Errors
    ///
    /// [`UsageError::CancellationAlreadyConfirmed`] once confirmed; nothing is
    /// sent in that case.
    pub async fn request(&mut self) -> Result<RefundInformation> {
        if let CancellationState::Confirmed { .. } = self.state {
            return Err(UsageError::CancellationAlreadyConfirmed.into());
        }

        let path = format!("/bookings/{}/request-cancellation", self.booking);
        let record = self
            .client
            .post::<_, CancellationRecord>(path, &serde_json::json!({}))
            .await?
            .data;

        tracing::debug!(
            cancellation_id = %record.id,
            booking_id = %self.booking,
            refund_status = ?record.refund_information.status,
            "Cancellation requested"
        );

        let refund = record.refund_information.clone();
        self.state = CancellationState::Requested {
            id: record.id,
            refund: record.refund_information,
        };
        Ok(refund)
    }

    /// Confirms a requested cancellation.
    ///
    /// # Errors
    ///
    /// Usage errors, raised before any request: the cancellation was never
    /// requested, or is already confirmed.
    pub async fn confirm(&mut self) -> Result<RefundInformation> {
        let id = match &self.state {
            CancellationState::NotRequested => {
                return Err(UsageError::CancellationNotRequested.into())
            }
            CancellationState::Confirmed { .. } => {
                return Err(UsageError::CancellationAlreadyConfirmed.into())
            }
            CancellationState::Requested { id, .. } => id,
        };

        let path = format!("/cancellations/{}/confirm", id);
        let record = self
            .client
            .post::<_, CancellationRecord>(path, &serde_json::json!({}))
            .await?
            .data;

        tracing::debug!(
            cancellation_id = %record.id,
            booking_id = %self.booking,
            refund_status = ?record.refund_information.status,
            "Cancellation confirmed"
        );

        let refund = record.refund_information.clone();
        self.state = CancellationState::Confirmed {
            id: record.id,
            refund: record.refund_information,
        };
        Ok(refund)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &CancellationState {
        &self.state
    }

    /// The booking being cancelled.
    pub fn booking_id(&self) -> &BookingId {
        &self.booking
    }

    /// The API id, once requested.
    pub fn id(&self) -> Option<&CancellationId> {
        match &self.state {
            CancellationState::NotRequested => None,
            CancellationState::Requested { id, .. } | CancellationState::Confirmed { id, .. } => {
                Some(id)
            }
        }
    }

    /// Latest refund quote or, once confirmed, the final refund.
    pub fn refund(&self) -> Option<&RefundInformation> {
        match &self.state {
            CancellationState::NotRequested => None,
            CancellationState::Requested { refund, .. }
            | CancellationState::Confirmed { refund, .. } => Some(refund),
        }
    }

    pub fn refund_status(&self) -> Option<RefundStatus> {
        self.refund().map(|refund| refund.status)
    }

    /// Returns `true` once [`confirm`](Cancellation::confirm) succeeded.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, CancellationState::Confirmed { .. })
    }
}

impl std::fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellation")
            .field("booking", &self.booking)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
