use super::*;
use fundraising_primitives::{
    EncryptedArithmetic, Ed25519InputVerifier, InputVerifier, UNINITIALIZED_HANDLE,
};
use proptest::prelude::*;

const TOKEN: u64 = 100;
const SPENDER: u64 = 7;

fn coprocessor() -> Coprocessor {
    Coprocessor::from_seed([3u8; 32])
}

#[test]
fn trivial_encrypt_decrypts_to_value() {
    let mut c = coprocessor();
    let h = c.trivial_encrypt(1_500_000).unwrap();
    assert_eq!(c.decrypt(&h), Ok(1_500_000));
}

#[test]
fn equal_values_get_distinct_handles() {
    let mut c = coprocessor();
    let a = c.trivial_encrypt(5).unwrap();
    let b = c.trivial_encrypt(5).unwrap();
    assert_ne!(a, b);
    assert_eq!(c.len(), 2);
}

#[test]
fn add_and_sub_wrap_in_u64() {
    let mut c = coprocessor();
    let max = c.trivial_encrypt(u64::MAX).unwrap();
    let one = c.trivial_encrypt(1).unwrap();
    let sum = c.add(&max, &one).unwrap();
    assert_eq!(c.decrypt(&sum), Ok(0));
    let diff = c.sub(&one, &max).unwrap();
    assert_eq!(c.decrypt(&diff), Ok(2));
}

#[test]
fn transferable_clamps_to_zero_when_short() {
    let mut c = coprocessor();
    let balance = c.trivial_encrypt(10).unwrap();
    let small = c.trivial_encrypt(10).unwrap();
    let big = c.trivial_encrypt(11).unwrap();

    let moved = c.transferable(&small, &balance).unwrap();
    assert_eq!(c.decrypt(&moved), Ok(10));
    let moved = c.transferable(&big, &balance).unwrap();
    assert_eq!(c.decrypt(&moved), Ok(0));
}

#[test]
fn unknown_handle_is_reported() {
    let mut c = coprocessor();
    let one = c.trivial_encrypt(1).unwrap();
    assert_eq!(c.decrypt(&[9u8; 32]), Err(CoprocessorError::UnknownHandle));
    assert_eq!(c.add(&one, &[9u8; 32]), Err(CoprocessorError::UnknownHandle));
}

#[test]
fn same_seed_derives_same_input_key() {
    assert_eq!(coprocessor().input_signer(), coprocessor().input_signer());
    assert_ne!(
        coprocessor().input_signer(),
        Coprocessor::from_seed([4u8; 32]).input_signer()
    );
}

#[test]
fn encrypted_input_carries_a_verifiable_attestation() {
    struct Key;
    impl sp_core::Get<ed25519::Public> for Key {
        fn get() -> ed25519::Public {
            coprocessor().input_signer()
        }
    }

    let mut c = coprocessor();
    let binding = InputBinding::new(TOKEN, SPENDER);
    let input = c.encrypt_input(250, &binding).unwrap();
    assert_eq!(c.decrypt(&input.handle), Ok(250));

    sp_io::TestExternalities::default().execute_with(|| {
        assert_eq!(
            <Ed25519InputVerifier<Key> as InputVerifier<u64>>::verify(
                &input.handle,
                &input.proof,
                &binding
            ),
            Ok(())
        );
        let other = InputBinding::new(TOKEN, SPENDER + 1);
        assert!(<Ed25519InputVerifier<Key> as InputVerifier<u64>>::verify(
            &input.handle,
            &input.proof,
            &other
        )
        .is_err());
    });
}

#[test]
fn local_adapter_substitutes_zero_for_unknown_operands() {
    LocalFhe::reset();
    let five = LocalFhe::encrypt_plaintext(5);
    let sum = LocalFhe::add(&UNINITIALIZED_HANDLE, &five);
    assert_eq!(LocalFhe::reveal(&sum), Ok(5));
    assert_ne!(sum, five);
}

#[test]
fn local_adapter_reset_forgets_ciphertexts() {
    LocalFhe::reset();
    let h = LocalFhe::encrypt_plaintext(1);
    LocalFhe::reset();
    assert_eq!(LocalFhe::reveal(&h), Err(CoprocessorError::UnknownHandle));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_add_matches_plaintext(a in any::<u64>(), b in any::<u64>()) {
        let mut c = coprocessor();
        let ha = c.trivial_encrypt(a).unwrap();
        let hb = c.trivial_encrypt(b).unwrap();
        let sum = c.add(&ha, &hb).unwrap();
        prop_assert_eq!(c.decrypt(&sum), Ok(a.wrapping_add(b)));
    }

    #[test]
    fn prop_clamped_move_conserves_value(balance in any::<u64>(), amount in any::<u64>()) {
        let mut c = coprocessor();
        let hb = c.trivial_encrypt(balance).unwrap();
        let ha = c.trivial_encrypt(amount).unwrap();
        let moved = c.transferable(&ha, &hb).unwrap();
        let left = c.sub(&hb, &moved).unwrap();
        let moved_v = c.decrypt(&moved).unwrap();
        prop_assert!(moved_v == amount || moved_v == 0);
        prop_assert_eq!(c.decrypt(&left).unwrap() + moved_v, balance);
    }
}
