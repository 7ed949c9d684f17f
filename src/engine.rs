// HeatEngine: the single entry point to the claim core
//
// Every mutating operation runs under one operation lock for its whole
// duration, so operations never interleave. The state lock is only held
// around reads and writes, never across the verifier call; queries therefore
// work from inside a verifier callback. Mutating calls are rejected with
// `Reentrant` while the verifier runs (from any thread) and when nested on
// the thread running the current operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use alloy_primitives::{Address, B256, U256};
use parking_lot::{Mutex, MutexGuard};

use crate::access::{Role, RoleTable, SystemStatus};
use crate::claim::{Claim, ClaimProcessor, MintReceipt};
use crate::error::{HeatError, Result};
use crate::events::{Event, EventKind};
use crate::fees::{FeeSplit, FeeSplitter};
use crate::state::{Counters, HeatState};
use crate::verifier::ProofVerifier;

pub struct HeatEngine {
    state: Mutex<HeatState>,
    operation: Mutex<()>,
    running_on: Mutex<Option<ThreadId>>,
    /// Set for the duration of the external verifier call
    verifying: AtomicBool,
    verifier: Box<dyn ProofVerifier>,
}

/// Held for the full duration of a mutating operation
struct OperationGuard<'a> {
    running_on: &'a Mutex<Option<ThreadId>>,
    _serial: MutexGuard<'a, ()>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        *self.running_on.lock() = None;
    }
}

/// Raises the in-flight flag; cleared on drop, including on unwind
struct VerifyingFlag<'a>(&'a AtomicBool);

impl<'a> VerifyingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for VerifyingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn require_active(state: &HeatState) -> Result<()> {
    match state.status {
        SystemStatus::Active => Ok(()),
        SystemStatus::Halted => Err(HeatError::SystemHalted),
    }
}

impl HeatEngine {
    pub fn new(roles: RoleTable, verifier: impl ProofVerifier + 'static) -> Self {
        Self::from_state(HeatState::new(roles), verifier)
    }

    /// Resume from a previously saved state
    pub fn from_state(state: HeatState, verifier: impl ProofVerifier + 'static) -> Self {
        Self {
            state: Mutex::new(state),
            operation: Mutex::new(()),
            running_on: Mutex::new(None),
            verifying: AtomicBool::new(false),
            verifier: Box::new(verifier),
        }
    }

    fn enter(&self) -> Result<OperationGuard<'_>> {
        if self.verifying.load(Ordering::SeqCst) {
            log::warn!("rejected mutating call while the verifier is running");
            return Err(HeatError::Reentrant);
        }
        let me = thread::current().id();
        if *self.running_on.lock() == Some(me) {
            log::warn!("rejected re-entrant call");
            return Err(HeatError::Reentrant);
        }

        let serial = self.operation.lock();
        *self.running_on.lock() = Some(me);
        Ok(OperationGuard {
            running_on: &self.running_on,
            _serial: serial,
        })
    }

    /// Lock state for an operation that may write; fails while halted
    fn active_state(&self) -> Result<MutexGuard<'_, HeatState>> {
        let state = self.state.lock();
        require_active(&state)?;
        Ok(state)
    }

    // ---- claims ----

    /// Authorize a mint from a burn proof
    pub fn submit_claim(&self, claim: &Claim) -> Result<MintReceipt> {
        let _op = self.enter()?;

        let inputs = {
            let state = self.active_state()?;
            ClaimProcessor::precheck(claim, &state.nullifiers)?
        };

        {
            let _flag = VerifyingFlag::raise(&self.verifying);
            ClaimProcessor::verify_proof(self.verifier.as_ref(), claim, &inputs)?;
        }

        let mut state = self.state.lock();
        ClaimProcessor::commit(&mut state, claim, &inputs)
    }

    // ---- fee collection ----

    pub fn collect_fees(&self, caller: Address, account: Address, total: U256) -> Result<FeeSplit> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;
        FeeSplitter::collect(&mut state, caller, account, total)
    }

    pub fn collect_fees_from(
        &self,
        caller: Address,
        account: Address,
        spender: Address,
        total: U256,
    ) -> Result<FeeSplit> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;
        FeeSplitter::collect_from(&mut state, caller, account, spender, total)
    }

    pub fn burn_from_treasury(&self, caller: Address, amount: U256) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;
        FeeSplitter::burn_from_treasury(&mut state, caller, amount)
    }

    // ---- fungible balance surface ----

    pub fn transfer(&self, caller: Address, to: Address, amount: U256) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;
        state.ledger.transfer_internal(caller, to, amount)?;
        state.events.push(Event::now(EventKind::Transfer { from: caller, to, amount }));
        Ok(())
    }

    pub fn approve(&self, caller: Address, spender: Address, amount: U256) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;
        state.ledger.approve(caller, spender, amount)?;
        state.events.push(Event::now(EventKind::Approval {
            owner: caller,
            spender,
            amount,
        }));
        Ok(())
    }

    /// `caller` moves `amount` from `from` to `to` using its allowance
    pub fn transfer_from(&self, caller: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.active_state()?;

        if to.is_zero() {
            return Err(HeatError::InvalidAccount);
        }
        let balance = state.ledger.balance_of(&from);
        if balance < amount {
            return Err(HeatError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }

        state.ledger.spend_allowance(from, caller, amount)?;
        state.ledger.transfer_internal(from, to, amount)?;
        state.events.push(Event::now(EventKind::Transfer { from, to, amount }));
        Ok(())
    }

    // ---- administration ----

    /// Owner hands `role` to `new_holder`; the zero address clears it
    pub fn set_role(&self, caller: Address, role: Role, new_holder: Address) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.state.lock();
        state.roles.require(Role::Owner, caller)?;

        let old = state.roles.assign(role, new_holder);
        let new = state.roles.holder(role);
        state.events.push(Event::now(EventKind::RoleChanged { role, old, new }));
        log::info!("role {} changed: {:?} -> {:?}", role, old, new);
        Ok(())
    }

    pub fn halt(&self, caller: Address) -> Result<()> {
        self.set_status(caller, SystemStatus::Halted)
    }

    pub fn resume(&self, caller: Address) -> Result<()> {
        self.set_status(caller, SystemStatus::Active)
    }

    fn set_status(&self, caller: Address, status: SystemStatus) -> Result<()> {
        let _op = self.enter()?;
        let mut state = self.state.lock();
        state.roles.require(Role::Owner, caller)?;

        if state.status != status {
            state.status = status;
            state.events.push(Event::now(EventKind::StatusChanged { status }));
            log::info!("system status set to {:?}", status);
        }
        Ok(())
    }

    // ---- queries ----

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.state.lock().ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.state.lock().ledger.allowance(owner, spender)
    }

    pub fn total_supply(&self) -> U256 {
        self.state.lock().ledger.total_supply()
    }

    pub fn max_supply(&self) -> U256 {
        self.state.lock().ledger.max_supply()
    }

    pub fn counters(&self) -> Counters {
        self.state.lock().counters.clone()
    }

    pub fn is_nullifier_used(&self, nullifier: &B256) -> bool {
        self.state.lock().nullifiers.is_used(nullifier)
    }

    pub fn role_holder(&self, role: Role) -> Option<Address> {
        self.state.lock().roles.holder(role)
    }

    pub fn status(&self) -> SystemStatus {
        self.state.lock().status
    }

    /// Copy of the full state, e.g. for persisting
    pub fn snapshot(&self) -> HeatState {
        self.state.lock().clone()
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&self) -> Vec<Event> {
        std::mem::take(&mut self.state.lock().events)
    }
}
