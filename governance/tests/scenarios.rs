//! End-to-end governance scenarios: deposits, proposals, voting and
//! finalization wired together with in-memory collaborators.

use quorum_governance::{
    Choice, ErrorKind, GovernanceConfig, GovernanceEngine, GovernanceError, IdScheme, Proposal,
    ProposalStatus, Role, VotingEngine,
};
use quorum_nullables::{NullClock, NullTarget, NullToken};
use quorum_types::{Address, Amount, GovernanceParams, ProposalId, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Engine = GovernanceEngine<NullToken, NullTarget>;

fn chair() -> Address {
    Address::new("chair")
}

fn admin() -> Address {
    Address::new("admin")
}

fn recipient() -> Address {
    Address::new("recipient")
}

fn engine_with(quorum: u128, duration: u64, scheme: IdScheme) -> Engine {
    let config = GovernanceConfig::new(
        chair(),
        admin(),
        Address::new("vote-token"),
        GovernanceParams::new(Amount::new(quorum), duration),
    )
    .expect("valid config")
    .with_id_scheme(scheme);
    GovernanceEngine::new(config, NullToken::new(Address::new("dao")), NullTarget::new())
}

fn engine() -> Engine {
    engine_with(100, 100, IdScheme::Timestamped)
}

/// Mint, approve and deposit `amount` for `who`.
fn member(engine: &mut Engine, who: &str, amount: u128) -> Address {
    let member = Address::new(who);
    engine
        .token_mut()
        .mint(&member, Amount::new(amount))
        .expect("mint");
    engine.token_mut().approve(&member, Amount::new(amount));
    engine
        .deposit(&member, Amount::new(amount))
        .expect("deposit");
    member
}

fn propose(engine: &mut Engine, description: &str, now: Timestamp) -> ProposalId {
    engine
        .create_proposal(
            &chair(),
            recipient(),
            b"transfer(recipient, 200)".to_vec(),
            description.into(),
            now,
        )
        .expect("create proposal")
}

// ---------------------------------------------------------------------------
// 1. Passing proposal lifecycle
// ---------------------------------------------------------------------------

#[test]
fn passing_proposal_dispatches_exactly_once() {
    let mut engine = engine();
    let clock = NullClock::new(0);
    let alice = member(&mut engine, "alice", 101);

    let id = propose(&mut engine, "pay recipient", clock.now());
    assert_eq!(
        engine.proposal(&id).unwrap().proposal.deadline,
        Timestamp::new(100)
    );

    clock.advance(1);
    engine.vote(&alice, &id, true, clock.now()).unwrap();

    clock.set(99);
    assert_eq!(
        engine.finalize(&id, clock.now()),
        Err(GovernanceError::VotingStillOpen {
            id,
            deadline: Timestamp::new(100)
        })
    );

    clock.advance(1);
    let outcome = engine.finalize(&id, clock.now()).unwrap();
    assert!(outcome.executed);
    assert_eq!(outcome.approve_weight, Amount::new(101));
    assert_eq!(engine.target().calls_to(&recipient()), 1);
    assert_eq!(
        engine.target().calls()[0].payload,
        b"transfer(recipient, 200)".to_vec()
    );

    clock.advance(1);
    assert_eq!(
        engine.finalize(&id, clock.now()),
        Err(GovernanceError::ProposalAlreadyClosed(id))
    );
    assert_eq!(engine.target().calls_to(&recipient()), 1);
    assert_eq!(engine.dispatched(), 1);
}

// ---------------------------------------------------------------------------
// 2. Failing target keeps everything frozen
// ---------------------------------------------------------------------------

#[test]
fn rejected_dispatch_rolls_back_finalize() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 100);
    let id = propose(&mut engine, "doomed", Timestamp::new(0));
    engine.vote(&alice, &id, true, Timestamp::new(1)).unwrap();
    engine.target_mut().reject(&recipient());

    let err = engine.finalize(&id, Timestamp::new(100)).unwrap_err();
    assert!(matches!(err, GovernanceError::ExecutionFailed { .. }));
    assert_eq!(err.kind(), ErrorKind::ExternalCollaborator);

    let record = engine.proposal(&id).unwrap();
    assert!(record.proposal.is_open());
    assert_eq!(engine.outstanding_votes(&alice), 1);
    assert!(matches!(
        engine.withdraw(&alice, Amount::new(1)),
        Err(GovernanceError::BalanceFrozen { .. })
    ));

    // Once the target is fixed out of band, finalize can be retried.
    engine.target_mut().accept(&recipient());
    let outcome = engine.finalize(&id, Timestamp::new(500)).unwrap();
    assert!(outcome.executed);
    engine.withdraw(&alice, Amount::new(100)).unwrap();
    assert_eq!(engine.token().balance_of(&alice), Amount::new(100));
}

#[test]
fn unreachable_target_is_execution_failure() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 100);
    let id = propose(&mut engine, "unreachable", Timestamp::new(0));
    engine.vote(&alice, &id, true, Timestamp::new(1)).unwrap();
    engine.target_mut().disconnect(&recipient());

    assert!(matches!(
        engine.finalize(&id, Timestamp::new(100)),
        Err(GovernanceError::ExecutionFailed { .. })
    ));
    assert_eq!(engine.open_proposals().count(), 1);
}

// ---------------------------------------------------------------------------
// 3. Frozen weight across several proposals
// ---------------------------------------------------------------------------

#[test]
fn withdraw_blocked_until_every_voted_proposal_closes() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 50);
    let first = propose(&mut engine, "first", Timestamp::new(0));
    let second = propose(&mut engine, "second", Timestamp::new(10));
    engine.vote(&alice, &first, true, Timestamp::new(11)).unwrap();
    engine.vote(&alice, &second, false, Timestamp::new(11)).unwrap();

    let outcome = engine.finalize(&first, Timestamp::new(100)).unwrap();
    assert!(!outcome.executed);
    assert_eq!(engine.frozen_weight(&alice), Amount::new(50));
    assert!(matches!(
        engine.withdraw(&alice, Amount::new(50)),
        Err(GovernanceError::BalanceFrozen { .. })
    ));

    engine.finalize(&second, Timestamp::new(110)).unwrap();
    assert_eq!(engine.frozen_weight(&alice), Amount::ZERO);
    engine.withdraw(&alice, Amount::new(50)).unwrap();
    assert_eq!(engine.weight_of(&alice), Amount::ZERO);
}

#[test]
fn deposit_after_voting_is_also_frozen() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 10);
    let id = propose(&mut engine, "p", Timestamp::new(0));
    engine.vote(&alice, &id, true, Timestamp::new(1)).unwrap();

    engine.token_mut().mint(&alice, Amount::new(5)).unwrap();
    engine.token_mut().approve(&alice, Amount::new(5));
    engine.deposit(&alice, Amount::new(5)).unwrap();

    assert_eq!(engine.weight_of(&alice), Amount::new(15));
    assert_eq!(engine.frozen_weight(&alice), Amount::new(15));
    assert!(matches!(
        engine.withdraw(&alice, Amount::new(5)),
        Err(GovernanceError::BalanceFrozen { .. })
    ));
    // The tally keeps the weight recorded at vote time.
    assert_eq!(engine.proposal(&id).unwrap().tally.approve, Amount::new(10));
}

// ---------------------------------------------------------------------------
// 4. Parameter administration
// ---------------------------------------------------------------------------

#[test]
fn zero_quorum_always_invalid_and_non_admin_unauthorized() {
    let mut engine = engine();
    for caller in [admin(), chair(), Address::new("stranger")] {
        assert_eq!(
            engine.set_minimum_quorum(&caller, Amount::ZERO),
            Err(GovernanceError::InvalidParameter {
                name: "minimum quorum"
            })
        );
    }
    assert_eq!(
        engine.set_minimum_quorum(&chair(), Amount::new(5)),
        Err(GovernanceError::Unauthorized {
            caller: chair(),
            role: Role::Admin
        })
    );
    assert_eq!(engine.config().params.minimum_quorum, Amount::new(100));

    engine.set_minimum_quorum(&admin(), Amount::new(5)).unwrap();
    assert_eq!(engine.config().params.minimum_quorum, Amount::new(5));
}

#[test]
fn only_chair_may_propose() {
    let mut engine = engine();
    let err = engine
        .create_proposal(&admin(), recipient(), vec![], "x".into(), Timestamp::new(0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(engine.proposal_count(), 0);
}

// ---------------------------------------------------------------------------
// 5. Proposal identity
// ---------------------------------------------------------------------------

#[test]
fn identical_submission_in_same_instant_is_duplicate() {
    let mut engine = engine();
    let id = propose(&mut engine, "same", Timestamp::new(7));
    assert_eq!(
        engine.create_proposal(
            &chair(),
            recipient(),
            b"transfer(recipient, 200)".to_vec(),
            "same".into(),
            Timestamp::new(7),
        ),
        Err(GovernanceError::DuplicateProposal(id))
    );

    let other_time = propose(&mut engine, "same", Timestamp::new(8));
    let other_text = propose(&mut engine, "different", Timestamp::new(7));
    let other_target = engine
        .create_proposal(
            &chair(),
            Address::new("elsewhere"),
            b"transfer(recipient, 200)".to_vec(),
            "same".into(),
            Timestamp::new(7),
        )
        .unwrap();
    let other_payload = engine
        .create_proposal(
            &chair(),
            recipient(),
            b"transfer(recipient, 201)".to_vec(),
            "same".into(),
            Timestamp::new(7),
        )
        .unwrap();
    let ids = [id, other_time, other_text, other_target, other_payload];
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(engine.proposal_count(), 5);
}

#[test]
fn content_only_scheme_rejects_resubmission_forever() {
    let mut engine = engine_with(10, 100, IdScheme::ContentOnly);
    let id = propose(&mut engine, "once", Timestamp::new(0));
    engine.finalize(&id, Timestamp::new(100)).unwrap();
    let err = engine
        .create_proposal(
            &chair(),
            recipient(),
            b"transfer(recipient, 200)".to_vec(),
            "once".into(),
            Timestamp::new(10_000),
        )
        .unwrap_err();
    assert_eq!(err, GovernanceError::DuplicateProposal(id));
}

// ---------------------------------------------------------------------------
// 6. Vote rejections
// ---------------------------------------------------------------------------

#[test]
fn vote_rejections_leave_tally_untouched() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 30);
    let nobody = Address::new("nobody");
    let id = propose(&mut engine, "p", Timestamp::new(0));

    assert_eq!(
        engine.vote(&nobody, &id, true, Timestamp::new(1)),
        Err(GovernanceError::InsufficientWeight(nobody.clone()))
    );
    engine.vote(&alice, &id, true, Timestamp::new(1)).unwrap();
    assert!(matches!(
        engine.vote(&alice, &id, true, Timestamp::new(2)),
        Err(GovernanceError::DuplicateVote { .. })
    ));
    assert!(matches!(
        engine.vote(&alice, &id, false, Timestamp::new(100)),
        Err(GovernanceError::VotingClosed { .. })
    ));

    let tally = engine.proposal(&id).unwrap().tally;
    assert_eq!(tally.approve, Amount::new(30));
    assert_eq!(tally.reject, Amount::ZERO);
    assert_eq!(engine.choice_of(&id, &alice), Some(Choice::Approve));
}

// ---------------------------------------------------------------------------
// 7. Token collaborator failures
// ---------------------------------------------------------------------------

#[test]
fn deposit_without_allowance_is_rejected() {
    let mut engine = engine();
    let bob = Address::new("bob");
    engine.token_mut().mint(&bob, Amount::new(100)).unwrap();

    let err = engine.deposit(&bob, Amount::new(100)).unwrap_err();
    assert!(matches!(err, GovernanceError::TransferUnauthorized { .. }));
    assert_eq!(engine.weight_of(&bob), Amount::ZERO);
    assert_eq!(engine.token().balance_of(&bob), Amount::new(100));
}

#[test]
fn failed_payout_keeps_weight() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 100);
    engine.token_mut().set_fail_transfers_out(true);

    let err = engine.withdraw(&alice, Amount::new(100)).unwrap_err();
    assert!(matches!(err, GovernanceError::TransferFailed { .. }));
    assert_eq!(engine.weight_of(&alice), Amount::new(100));
    assert_eq!(engine.total_deposited(), engine.token().custody_balance());
}

// ---------------------------------------------------------------------------
// 8. Quorum counts approve weight only
// ---------------------------------------------------------------------------

#[test]
fn approve_quorum_dispatches_despite_larger_reject_weight() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", 100);
    let bob = member(&mut engine, "bob", 500);

    let id = propose(&mut engine, "contested payout", Timestamp::new(0));
    engine.vote(&alice, &id, true, Timestamp::new(1)).unwrap();
    engine.vote(&bob, &id, false, Timestamp::new(2)).unwrap();

    let outcome = engine.finalize(&id, Timestamp::new(100)).unwrap();
    assert!(outcome.quorum_met);
    assert!(outcome.executed);
    assert_eq!(outcome.approve_weight, Amount::new(100));
    assert_eq!(outcome.reject_weight, Amount::new(500));
    assert_eq!(engine.dispatched(), 1);
    assert_eq!(engine.target().calls_to(&recipient()), 1);
}

#[test]
fn reject_weight_alone_never_meets_quorum() {
    let mut engine = engine();
    let bob = member(&mut engine, "bob", 500);

    let id = propose(&mut engine, "unpopular payout", Timestamp::new(0));
    engine.vote(&bob, &id, false, Timestamp::new(1)).unwrap();

    let outcome = engine.finalize(&id, Timestamp::new(100)).unwrap();
    assert!(!outcome.quorum_met);
    assert!(!outcome.executed);
    assert_eq!(engine.dispatched(), 0);
    assert_eq!(engine.frozen_weight(&bob), Amount::ZERO);
}

// ---------------------------------------------------------------------------
// 9. Arithmetic overflow leaves state unchanged
// ---------------------------------------------------------------------------

#[test]
fn deadline_overflow_creates_nothing() {
    let mut engine = engine();

    let err = engine
        .create_proposal(
            &chair(),
            recipient(),
            vec![],
            "too late".into(),
            Timestamp::new(u64::MAX),
        )
        .unwrap_err();
    assert_eq!(err, GovernanceError::Overflow("proposal deadline"));
    assert_eq!(err.kind(), ErrorKind::Arithmetic);
    assert_eq!(engine.proposal_count(), 0);
    assert!(engine.open_proposals().next().is_none());

    // The same content is still accepted at a representable time.
    engine
        .create_proposal(&chair(), recipient(), vec![], "too late".into(), Timestamp::new(0))
        .unwrap();
    assert_eq!(engine.proposal_count(), 1);
}

#[test]
fn weight_overflow_rejects_deposit_without_transfer() {
    let mut engine = engine();
    let alice = member(&mut engine, "alice", u128::MAX);
    engine.token_mut().mint(&alice, Amount::new(1)).unwrap();
    engine.token_mut().approve(&alice, Amount::new(1));

    let err = engine.deposit(&alice, Amount::new(1)).unwrap_err();
    assert_eq!(err, GovernanceError::Overflow("member weight"));
    assert_eq!(engine.weight_of(&alice), Amount::new(u128::MAX));
    assert_eq!(engine.total_deposited(), Amount::new(u128::MAX));
    assert_eq!(engine.token().balance_of(&alice), Amount::new(1));
    assert_eq!(engine.token().allowance(&alice), Amount::new(1));
    assert_eq!(engine.token().custody_balance(), Amount::new(u128::MAX));
}

#[test]
fn total_overflow_rejects_second_member_deposit() {
    let mut engine = engine();
    member(&mut engine, "alice", u128::MAX);
    let bob = Address::new("bob");
    engine.token_mut().mint(&bob, Amount::new(1)).unwrap();
    engine.token_mut().approve(&bob, Amount::new(1));

    let err = engine.deposit(&bob, Amount::new(1)).unwrap_err();
    assert_eq!(err, GovernanceError::Overflow("total deposits"));
    assert_eq!(engine.weight_of(&bob), Amount::ZERO);
    assert_eq!(engine.total_deposited(), Amount::new(u128::MAX));
    assert_eq!(engine.token().balance_of(&bob), Amount::new(1));
}

#[test]
fn tally_overflow_records_no_vote() {
    let proposal = Proposal {
        id: ProposalId::new([7; 32]),
        sequence: 0,
        target: recipient(),
        payload: vec![],
        description: "huge".into(),
        created_at: Timestamp::EPOCH,
        deadline: Timestamp::new(100),
        status: ProposalStatus::Open,
    };
    let whale = Address::new("whale");
    let minnow = Address::new("minnow");
    let mut voting = VotingEngine::new();
    voting
        .cast(&proposal, &whale, Choice::Approve, Amount::new(u128::MAX), Timestamp::new(1))
        .unwrap();

    let err = voting
        .cast(&proposal, &minnow, Choice::Approve, Amount::new(1), Timestamp::new(2))
        .unwrap_err();
    assert_eq!(err, GovernanceError::Overflow("vote tally"));

    let tally = voting.tally(0).unwrap();
    assert_eq!(tally.approve, Amount::new(u128::MAX));
    assert_eq!(tally.voters.len(), 1);
    assert_eq!(tally.choice_of(&minnow), None);
    assert_eq!(voting.outstanding_votes(&minnow), 0);
}
