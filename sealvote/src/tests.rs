use super::*;

const ADMIN: Address = Address([0xad; 20]);
const ALICE: Address = Address([0xa1; 20]);
const BOB: Address = Address([0xb0; 20]);
const CAROL: Address = Address([0xca; 20]);

const T0: Timestamp = 1_000;

fn ledger() -> Ledger {
    let mut genesis = GenesisConfig::new(ADMIN);
    genesis.genesis_time = T0;
    Ledger::new(genesis)
}

fn params(name: &str, gating_enabled: bool) -> ElectionParams {
    ElectionParams {
        name: name.to_owned(),
        start_time: T0 + 10,
        commit_deadline: T0 + 110,
        reveal_deadline: T0 + 210,
        candidate_ids: vec![1, 2, 3],
        gating_enabled,
    }
}

fn create(ledger: &mut Ledger, params: ElectionParams) -> ElectionId {
    let receipt = ledger
        .execute(ADMIN, Transaction::CreateElection(params))
        .unwrap();
    receipt.election_id().unwrap()
}

fn commit(ledger: &mut Ledger, voter: Address, election_id: ElectionId, candidate_id: CandidateId) -> Salt {
    let salt = Salt::random();
    let receipt = ledger
        .execute(
            voter,
            Transaction::CommitVote {
                election_id,
                commitment: commitment_hash(candidate_id, &salt),
            },
        )
        .unwrap();
    assert!(receipt.is_success(), "{:?}", receipt.outcome);
    salt
}

fn reveal(
    ledger: &mut Ledger,
    voter: Address,
    election_id: ElectionId,
    candidate_id: CandidateId,
    salt: &Salt,
) -> Receipt {
    ledger
        .execute(
            voter,
            Transaction::RevealVote {
                election_id,
                candidate_id,
                salt: *salt,
            },
        )
        .unwrap()
}

fn finalize(ledger: &mut Ledger, sender: Address, election_id: ElectionId) -> Receipt {
    ledger
        .execute(sender, Transaction::Finalize { election_id })
        .unwrap()
}

#[test]
fn end_to_end_election() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Student council", false));
    assert_eq!(id, 1);
    assert_eq!(ledger.elections_count(), 1);
    assert_eq!(ledger.phase(id).unwrap(), Phase::Pending);

    // Commit phase
    ledger.set_time(T0 + 20).unwrap();
    let salt = commit(&mut ledger, ALICE, id, 1);
    assert!(!ledger.commits(id, &ALICE).is_zero());
    assert!(!ledger.revealed(id, &ALICE));

    // Nothing is counted until reveal
    assert_eq!(ledger.get_tally(id, 1), 0);

    // Reveal phase
    ledger.set_time(T0 + 120).unwrap();
    let receipt = reveal(&mut ledger, ALICE, id, 1, &salt);
    assert!(receipt.is_success());
    assert_eq!(ledger.get_tally(id, 1), 1);
    assert!(ledger.revealed(id, &ALICE));

    // Anyone may finalize once the reveal phase is over
    ledger.set_time(T0 + 211).unwrap();
    assert!(finalize(&mut ledger, BOB, id).is_success());
    assert!(ledger.get_times(id).unwrap().finalized);
    assert_eq!(ledger.phase(id).unwrap(), Phase::Ended);

    let again = finalize(&mut ledger, BOB, id);
    assert_eq!(again.reason(), Some("Already finalized"));

    let results = ledger.results(id).unwrap();
    let counted: Vec<(CandidateId, u64)> = results.into_iter().collect();
    assert_eq!(counted, vec![(1, 1), (2, 0), (3, 0)]);

    let types: Vec<EventType> = ledger
        .events_since(0)
        .iter()
        .map(|r| r.event.event_type())
        .collect();
    assert_eq!(
        types,
        vec![
            EventType::ElectionCreated,
            EventType::VoteCommitted,
            EventType::VoteRevealed,
            EventType::ElectionFinalized
        ]
    );
    ledger.verify_chain().unwrap();
}

#[test]
fn deadlines_are_inclusive() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Boundaries", false));

    ledger.set_time(T0 + 9).unwrap();
    let early = ledger
        .execute(
            ALICE,
            Transaction::CommitVote {
                election_id: id,
                commitment: commitment_hash(1, &Salt::random()),
            },
        )
        .unwrap();
    assert_eq!(early.reason(), Some("Too early"));

    // Commit at exactly the start and exactly the deadline
    ledger.set_time(T0 + 10).unwrap();
    let alice_salt = commit(&mut ledger, ALICE, id, 2);
    ledger.set_time(T0 + 110).unwrap();
    let bob_salt = commit(&mut ledger, BOB, id, 3);

    // Revealing at the commit deadline is still too soon
    let soon = reveal(&mut ledger, ALICE, id, 2, &alice_salt);
    assert_eq!(soon.reason(), Some("Commit phase"));

    ledger.set_time(T0 + 111).unwrap();
    let late = ledger
        .execute(
            CAROL,
            Transaction::CommitVote {
                election_id: id,
                commitment: commitment_hash(1, &Salt::random()),
            },
        )
        .unwrap();
    assert_eq!(late.reason(), Some("Commit phase over"));
    assert!(reveal(&mut ledger, ALICE, id, 2, &alice_salt).is_success());

    // Reveal at exactly the reveal deadline
    ledger.set_time(T0 + 210).unwrap();
    assert!(reveal(&mut ledger, BOB, id, 3, &bob_salt).is_success());
    assert_eq!(finalize(&mut ledger, ADMIN, id).reason(), Some("Reveal not over"));

    ledger.set_time(T0 + 211).unwrap();
    assert!(finalize(&mut ledger, ADMIN, id).is_success());
}

#[test]
fn gated_election() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Members only", true));
    ledger.set_time(T0 + 20).unwrap();

    let commitment = commitment_hash(2, &Salt::random());
    let denied = ledger
        .execute(
            ALICE,
            Transaction::CommitVote {
                election_id: id,
                commitment,
            },
        )
        .unwrap();
    assert_eq!(denied.reason(), Some("No voting right"));
    assert!(ledger.commits(id, &ALICE).is_zero());

    let grant = ledger
        .execute(
            ADMIN,
            Transaction::GrantBatch {
                election_id: id,
                accounts: vec![ALICE, ALICE],
            },
        )
        .unwrap();
    assert_eq!(grant.outcome, Ok(Outcome::Changed(1)));
    assert!(ledger.has_right(&ALICE, id));
    assert_eq!(ledger.balance_of(&ALICE, id), 1);

    let salt = commit(&mut ledger, ALICE, id, 2);

    // Revoking after commit does not invalidate the commitment
    ledger
        .execute(
            ADMIN,
            Transaction::RevokeBatch {
                election_id: id,
                accounts: vec![ALICE],
            },
        )
        .unwrap();
    assert!(!ledger.has_right(&ALICE, id));

    ledger.set_time(T0 + 150).unwrap();
    assert!(reveal(&mut ledger, ALICE, id, 2, &salt).is_success());
    assert_eq!(ledger.get_tally(id, 2), 1);
}

#[test]
fn rights_cannot_move() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Soulbound", true));
    ledger
        .execute(
            ADMIN,
            Transaction::GrantBatch {
                election_id: id,
                accounts: vec![ALICE],
            },
        )
        .unwrap();

    let receipts = ledger
        .execute_block(vec![
            (
                ALICE,
                Transaction::SafeTransferFrom {
                    from: ALICE,
                    to: BOB,
                    election_id: id,
                    amount: 1,
                },
            ),
            (
                ALICE,
                Transaction::SafeBatchTransferFrom {
                    from: ALICE,
                    to: BOB,
                    election_ids: vec![id],
                    amounts: vec![1],
                },
            ),
            (
                ALICE,
                Transaction::SetApprovalForAll {
                    operator: BOB,
                    approved: true,
                },
            ),
        ])
        .unwrap();

    assert_eq!(receipts[0].reason(), Some("SBT: transfer disabled"));
    assert_eq!(receipts[1].reason(), Some("SBT: transfer disabled"));
    assert_eq!(receipts[2].reason(), Some("SBT: approvals disabled"));
    assert!(ledger.has_right(&ALICE, id));
    assert!(!ledger.has_right(&BOB, id));
    assert!(!ledger.is_approved_for_all(&ALICE, &BOB));
}

#[test]
fn many_voters() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Popular vote", false));
    ledger.set_time(T0 + 20).unwrap();

    let ballots: Vec<(Address, CandidateId)> = (1..=9u8)
        .map(|i| (Address([i; 20]), (i as u64 % 3) + 1))
        .collect();
    let salts: Vec<Salt> = ballots
        .iter()
        .map(|(voter, candidate)| commit(&mut ledger, *voter, id, *candidate))
        .collect();

    ledger.set_time(T0 + 120).unwrap();
    for ((voter, candidate), salt) in ballots.iter().zip(salts.iter()) {
        assert!(reveal(&mut ledger, *voter, id, *candidate, salt).is_success());
    }

    // One voter tries to reveal twice
    let (voter, candidate) = ballots[0];
    let twice = reveal(&mut ledger, voter, id, candidate, &salts[0]);
    assert_eq!(twice.reason(), Some("Already revealed"));

    for candidate_id in 1..=3 {
        assert_eq!(ledger.get_tally(id, candidate_id), 3);
    }
}

#[test]
fn bad_reveals() {
    let mut ledger = ledger();
    let id = create(&mut ledger, params("Careful", false));
    ledger.set_time(T0 + 20).unwrap();
    let salt = commit(&mut ledger, ALICE, id, 1);

    ledger.set_time(T0 + 120).unwrap();
    assert_eq!(
        reveal(&mut ledger, BOB, id, 1, &salt).reason(),
        Some("No commit")
    );
    assert_eq!(
        reveal(&mut ledger, ALICE, id, 2, &salt).reason(),
        Some("Invalid reveal")
    );
    assert_eq!(
        reveal(&mut ledger, ALICE, id, 1, &Salt::random()).reason(),
        Some("Invalid reveal")
    );
    assert!(reveal(&mut ledger, ALICE, id, 1, &salt).is_success());
    assert_eq!(ledger.get_tally(id, 1), 1);
    assert_eq!(ledger.get_tally(id, 2), 0);
}

#[test]
fn elections_are_isolated() {
    let mut ledger = ledger();
    let first = create(&mut ledger, params("First", false));
    let second = create(&mut ledger, params("Second", false));
    assert_eq!((first, second), (1, 2));

    ledger.set_time(T0 + 20).unwrap();
    let salt = commit(&mut ledger, ALICE, first, 1);

    // The same voter may commit independently in another election
    let other_salt = commit(&mut ledger, ALICE, second, 3);

    ledger.set_time(T0 + 120).unwrap();
    assert!(reveal(&mut ledger, ALICE, first, 1, &salt).is_success());

    // A commitment from one election does not open in another
    assert_eq!(
        reveal(&mut ledger, ALICE, second, 1, &salt).reason(),
        Some("Invalid reveal")
    );
    assert!(reveal(&mut ledger, ALICE, second, 3, &other_salt).is_success());

    assert_eq!(ledger.get_tally(first, 1), 1);
    assert_eq!(ledger.get_tally(second, 1), 0);
    assert_eq!(ledger.get_tally(second, 3), 1);
}

#[test]
fn failed_creation_allocates_nothing() {
    let mut ledger = ledger();

    let mut backwards = params("Backwards", false);
    backwards.reveal_deadline = backwards.commit_deadline;
    let receipt = ledger
        .execute(ADMIN, Transaction::CreateElection(backwards))
        .unwrap();
    assert_eq!(receipt.reason(), Some("Times order"));

    let unnamed = params("", false);
    let receipt = ledger
        .execute(ADMIN, Transaction::CreateElection(unnamed))
        .unwrap();
    assert_eq!(receipt.reason(), Some("Empty name"));

    let stranger = ledger
        .execute(ALICE, Transaction::CreateElection(params("Coup", false)))
        .unwrap();
    assert_eq!(stranger.reason(), Some("Missing role"));

    assert_eq!(ledger.elections_count(), 0);
    assert!(ledger.events_since(0).is_empty());
    assert_eq!(
        ledger.get_election(1),
        Err(ValidationError::ElectionNotFound(1))
    );

    // The next successful creation still gets the first id
    assert_eq!(create(&mut ledger, params("Proper", false)), 1);
}

#[test]
fn role_administration() {
    let mut ledger = ledger();

    let denied = ledger
        .execute(
            ALICE,
            Transaction::GrantRole {
                role: Role::ElectionAuthority,
                account: ALICE,
            },
        )
        .unwrap();
    assert_eq!(denied.reason(), Some("Missing role"));

    let granted = ledger
        .execute(
            ADMIN,
            Transaction::GrantRole {
                role: Role::ElectionAuthority,
                account: ALICE,
            },
        )
        .unwrap();
    assert_eq!(granted.outcome, Ok(Outcome::Changed(1)));
    assert!(ledger.has_role(Role::ElectionAuthority, &ALICE));

    let receipt = ledger
        .execute(ALICE, Transaction::CreateElection(params("Delegated", false)))
        .unwrap();
    assert_eq!(receipt.election_id(), Some(1));

    let revoked = ledger
        .execute(
            ADMIN,
            Transaction::RevokeRole {
                role: Role::ElectionAuthority,
                account: ALICE,
            },
        )
        .unwrap();
    assert_eq!(revoked.outcome, Ok(Outcome::Changed(1)));
    let receipt = ledger
        .execute(ALICE, Transaction::CreateElection(params("Again", false)))
        .unwrap();
    assert_eq!(receipt.reason(), Some("Missing role"));
}

#[test]
fn snapshot_resumes_election() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealvote.json");

    let mut ledger = ledger();
    let id = create(&mut ledger, params("Persistent", false));
    ledger.set_time(T0 + 20).unwrap();
    let salt = commit(&mut ledger, ALICE, id, 3);
    ledger.save(&path).unwrap();

    let mut restored = Ledger::<MemStore>::load(&path).unwrap();
    assert_eq!(restored.commits(id, &ALICE), ledger.commits(id, &ALICE));
    restored.set_time(T0 + 120).unwrap();
    assert!(reveal(&mut restored, ALICE, id, 3, &salt).is_success());
    assert_eq!(restored.get_tally(id, 3), 1);
    restored.verify_chain().unwrap();
}

#[test]
fn indexer_follows_ledger() {
    #[derive(Default)]
    struct Finalized(Vec<ElectionId>);

    impl AnalysisTrigger for Finalized {
        fn election_finalized(&mut self, election_id: ElectionId) {
            self.0.push(election_id);
        }
    }

    let mut ledger = ledger();
    let mut indexer = Indexer::new(MemAuditLog::default(), Finalized::default());

    let id = create(&mut ledger, params("Audited", false));
    ledger.set_time(T0 + 20).unwrap();
    let salt = commit(&mut ledger, ALICE, id, 2);
    assert_eq!(indexer.sync(&ledger), 2);

    // Nothing new since the last sync
    assert_eq!(indexer.sync(&ledger), 0);

    ledger.set_time(T0 + 120).unwrap();
    reveal(&mut ledger, ALICE, id, 2, &salt);
    ledger.set_time(T0 + 220).unwrap();
    finalize(&mut ledger, ADMIN, id);
    assert_eq!(indexer.sync(&ledger), 2);
    assert_eq!(indexer.cursor(), 4);

    // Redelivering the whole log changes nothing
    for record in ledger.events_since(0) {
        assert!(!indexer.ingest(record));
    }

    assert_eq!(indexer.audit().by_election(id).len(), 4);
    assert_eq!(indexer.trigger().0, vec![id]);
    let view = indexer.election(id).unwrap();
    assert!(view.finalized);
    assert_eq!(view.candidate_ids, vec![1, 2, 3]);
}
