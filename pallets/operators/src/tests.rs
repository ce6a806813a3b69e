use crate::{mock::*, Error, Event, Operators as Grants};
use frame_support::{assert_noop, assert_ok};
use fundraising_primitives::OperatorRegistry;

fn last_event() -> RuntimeEvent {
    frame_system::Pallet::<Runtime>::events()
        .pop()
        .expect("event")
        .event
}

#[test]
fn set_operator_records_grant_and_emits_event() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            BOB,
            GENESIS + 3_600
        ));
        assert_eq!(Grants::<Runtime>::get(ALICE, BOB), Some(GENESIS + 3_600));
        assert!(Operators::is_operator(&ALICE, &BOB));
        // Grants are directional.
        assert!(!Operators::is_operator(&BOB, &ALICE));
        assert!(!Operators::is_operator(&ALICE, &CHARLIE));

        assert_eq!(
            last_event(),
            RuntimeEvent::Operators(Event::OperatorSet {
                holder: ALICE,
                operator: BOB,
                valid_until: GENESIS + 3_600,
            })
        );
    });
}

#[test]
fn expiry_must_be_in_the_future() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            Operators::set_operator(RuntimeOrigin::signed(ALICE), BOB, GENESIS),
            Error::<Runtime>::InvalidExpiry
        );
        assert_noop!(
            Operators::set_operator(RuntimeOrigin::signed(ALICE), BOB, GENESIS - 1),
            Error::<Runtime>::InvalidExpiry
        );
        assert_noop!(
            Operators::set_operator(RuntimeOrigin::signed(ALICE), BOB, 0),
            Error::<Runtime>::InvalidExpiry
        );
    });
}

#[test]
fn grant_lapses_at_valid_until() {
    new_test_ext().execute_with(|| {
        let until = GENESIS + 10;
        assert_ok!(Operators::set_operator(RuntimeOrigin::signed(ALICE), BOB, until));

        set_now(until - 1);
        assert!(Operators::is_operator(&ALICE, &BOB));
        set_now(until);
        assert!(!Operators::is_operator(&ALICE, &BOB));

        // The record outlives its validity; only the check changes.
        assert_eq!(Operators::operator_expiry(&ALICE, &BOB), Some(until));
    });
}

#[test]
fn last_write_wins() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            BOB,
            GENESIS + 1_000
        ));
        assert_ok!(Operators::set_operator(RuntimeOrigin::signed(ALICE), BOB, GENESIS + 5));
        assert_eq!(Operators::operator_expiry(&ALICE, &BOB), Some(GENESIS + 5));

        set_now(GENESIS + 5);
        assert!(!Operators::is_operator(&ALICE, &BOB));
    });
}

#[test]
fn revoke_removes_grant() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            BOB,
            GENESIS + 100
        ));
        assert_ok!(Operators::revoke_operator(RuntimeOrigin::signed(ALICE), BOB));
        assert!(!Operators::is_operator(&ALICE, &BOB));
        assert_eq!(Operators::operator_expiry(&ALICE, &BOB), None);
        assert_eq!(
            last_event(),
            RuntimeEvent::Operators(Event::OperatorRevoked {
                holder: ALICE,
                operator: BOB,
            })
        );

        assert_noop!(
            Operators::revoke_operator(RuntimeOrigin::signed(ALICE), BOB),
            Error::<Runtime>::NotFound
        );
    });
}

#[test]
fn registry_trait_uses_supplied_clock() {
    new_test_ext().execute_with(|| {
        assert_ok!(Operators::set_operator(
            RuntimeOrigin::signed(ALICE),
            BOB,
            GENESIS + 50
        ));
        assert!(<Operators as OperatorRegistry<AccountId, u64>>::is_operator(
            &ALICE,
            &BOB,
            GENESIS + 49
        ));
        assert!(!<Operators as OperatorRegistry<AccountId, u64>>::is_operator(
            &ALICE,
            &BOB,
            GENESIS + 50
        ));
        assert!(!<() as OperatorRegistry<AccountId, u64>>::is_operator(&ALICE, &BOB, 0));
    });
}
