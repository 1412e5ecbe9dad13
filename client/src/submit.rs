//! Extrinsic lifecycle: submit once, watch the status stream, settle exactly once.

use std::sync::Arc;

use futures::StreamExt;
pub use healthchain_config::client::{TransactionConfig, WaitFor};
use healthchain_data_model::{
    call::Call,
    error::DispatchError,
    events::{Event, LifecycleStage, Notification},
    result::{ActionError, ActionResult, Receipt},
    BlockHash,
};
use healthchain_logger::prelude::*;
use tokio::time::{timeout_at, Instant};

use crate::{
    chain::{ChainClient, Subscription},
    classify::{classify, Classification},
    decode::describe,
    promise::{self, Settle},
    signer::Signer,
};

/// What to do after one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// No terminal determination yet
    Wait,
    /// Arrived after settlement
    Discard,
    /// The runtime reported a dispatch error
    Dispatch(DispatchError),
    /// The extrinsic failed without a dispatch error to decode
    Fail(ActionError),
    /// The extrinsic succeeded in `block_hash`
    Succeed {
        /// Block to report
        block_hash: BlockHash,
        /// Events of the extrinsic
        events: Vec<Event>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Pending,
    SucceededAwaitingFinality(Vec<Event>),
    Settled,
}

/// Transition table of one watched extrinsic.
#[derive(Debug, Clone)]
pub struct Tracker {
    wait_for: WaitFor,
    state: State,
}

impl Tracker {
    /// Tracker for a fresh submission.
    pub const fn new(wait_for: WaitFor) -> Self {
        Self {
            wait_for,
            state: State::Pending,
        }
    }

    /// Whether a terminal determination was made.
    pub fn is_completed(&self) -> bool {
        self.state == State::Settled
    }

    /// Feed the next notification. Every step other than [`Step::Wait`] completes the tracker.
    pub fn step(&mut self, notification: &Notification) -> Step {
        if self.is_completed() {
            return Step::Discard;
        }
        let step = self.transition(notification);
        if step != Step::Wait {
            self.state = State::Settled;
        }
        step
    }

    fn transition(&mut self, notification: &Notification) -> Step {
        if let Some(error) = &notification.dispatch_error {
            return Step::Dispatch(error.clone());
        }

        let stage = notification.stage;
        let succeed = |block_hash| Step::Succeed {
            block_hash,
            events: notification.events.clone(),
        };

        match (classify(&notification.events), stage) {
            (Classification::Failed, _) => Step::Fail(ActionError::FinalizedWithFailure),
            (Classification::Succeeded, LifecycleStage::Finalized(block_hash)) => {
                succeed(block_hash)
            }
            (Classification::Succeeded, LifecycleStage::InBlock(block_hash)) => {
                match self.wait_for {
                    WaitFor::InBlock => succeed(block_hash),
                    WaitFor::Finalized => {
                        debug!(%block_hash, "Success seen in block, waiting for finality");
                        self.state = State::SucceededAwaitingFinality(notification.events.clone());
                        Step::Wait
                    }
                }
            }
            (Classification::Succeeded, LifecycleStage::FinalityTimeout(block_hash))
                if self.wait_for == WaitFor::InBlock =>
            {
                succeed(block_hash)
            }
            (_, LifecycleStage::Retracted(block_hash)) => {
                if matches!(self.state, State::SucceededAwaitingFinality(_)) {
                    debug!(%block_hash, "Block retracted, forgetting success");
                    self.state = State::Pending;
                }
                Step::Wait
            }
            (_, LifecycleStage::Finalized(block_hash)) => {
                match core::mem::replace(&mut self.state, State::Pending) {
                    State::SucceededAwaitingFinality(events) => Step::Succeed { block_hash, events },
                    _ => Step::Fail(ActionError::NoSuccess(stage)),
                }
            }
            (_, stage) if stage.is_rejection() => Step::Fail(ActionError::Rejected(stage)),
            (_, stage) if stage.is_terminal() => Step::Fail(ActionError::NoSuccess(stage)),
            _ => Step::Wait,
        }
    }
}

/// Signs, submits and watches calls on a shared chain connection.
pub struct Submitter<C: ?Sized> {
    chain: Arc<C>,
    config: TransactionConfig,
}

impl<C: ?Sized> Clone for Submitter<C> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            config: self.config,
        }
    }
}

impl<C: ?Sized> core::fmt::Debug for Submitter<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Submitter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: ChainClient + ?Sized> Submitter<C> {
    /// Construct a submitter over `chain`.
    pub fn new(chain: Arc<C>, config: TransactionConfig) -> Self {
        Self { chain, config }
    }

    /// Chain connection in use.
    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    /// Submit `call` signed by `signer` and wait until it settles.
    ///
    /// Resolves exactly once. The status subscription is released before returning.
    #[log(skip_all, fields(call = %call, signer = %signer.account_id(), tx = %call.hash()))]
    pub async fn submit(&self, call: &Call, signer: &dyn Signer) -> ActionResult {
        let (outcome, settle) = promise::pending();
        let timeout = self.config.status_timeout;
        let deadline = Instant::now() + timeout;

        match timeout_at(deadline, self.chain.sign_and_watch(call, signer)).await {
            Ok(Ok(mut subscription)) => {
                let watched =
                    timeout_at(deadline, self.watch(&mut subscription, call, &settle)).await;
                if watched.is_err() && settle.reject(ActionError::Timeout(timeout)) {
                    warn!(?timeout, "No terminal status before the deadline");
                }
                subscription.release();
            }
            Ok(Err(error)) => {
                warn!(%error, "Failed to submit extrinsic");
                settle.reject(ActionError::Transport(error.to_string()));
            }
            Err(_) => {
                warn!(?timeout, "Submission did not complete before the deadline");
                settle.reject(ActionError::Timeout(timeout));
            }
        }
        drop(settle);

        outcome
            .await
            .unwrap_or_else(|abandoned| Err(ActionError::Transport(abandoned.to_string())))
    }

    async fn watch(
        &self,
        subscription: &mut Subscription,
        call: &Call,
        settle: &Settle<Receipt, ActionError>,
    ) {
        let mut tracker = Tracker::new(self.config.wait_for);

        while let Some(notification) = subscription.next().await {
            trace!(?notification, "Status notification");
            let step = tracker.step(&notification);
            debug!(stage = %notification.stage, ?step, "Transition");

            match step {
                Step::Wait | Step::Discard => continue,
                Step::Dispatch(error) => {
                    settle.reject(describe(self.chain.metadata(), &error));
                }
                Step::Fail(error) => {
                    settle.reject(error);
                }
                Step::Succeed { block_hash, events } => {
                    match self.chain.block_number(&block_hash).await {
                        Ok(block_number) => settle.resolve(Receipt {
                            block_number,
                            transaction_hash: call.hash(),
                            block_hash,
                            events,
                        }),
                        Err(error) => {
                            warn!(%block_hash, %error, "Failed to fetch including block");
                            settle.reject(ActionError::BlockQuery {
                                hash: block_hash,
                                reason: error.to_string(),
                            })
                        }
                    };
                }
            }
            subscription.release();
            return;
        }

        if settle.reject(ActionError::SubscriptionClosed) {
            warn!("Status subscription closed before a terminal status");
        }
    }
}
