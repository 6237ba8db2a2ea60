use beer_pot::{
    LedgerError, Money, Participants, Pot, Side, TransactionEdit,
    interchange::{self, InterchangeError},
};

fn evening() -> Pot {
    let mut pot = Pot::new(Participants::default());
    pot.record_bet(false, false, "Wer kocht? \"Sven\", sagt Sevi", Money::from_cents(350))
        .unwrap();
    pot.reset();
    pot.record_bet(false, true, "Tippspiel", Money::from_cents(500))
        .unwrap();
    pot.record_bet(true, true, "", Money::from_cents(500))
        .unwrap();
    pot.record_purchase(Money::from_cents(420), Side::Second, "Kiosk\nzweite Zeile")
        .unwrap();
    pot.record_transfer(Money::from_cents(80), Side::First, Side::Second, "")
        .unwrap();
    pot
}

#[test]
fn test_import_of_export_reproduces_history() {
    let pot = evening();
    let csv = interchange::export_string(&pot).unwrap();

    let imported = interchange::import(csv.as_bytes(), pot.participants()).unwrap();
    assert_eq!(imported.history, pot.history());
    assert_eq!(imported.last_reset.as_ref(), pot.last_reset());

    let mut restored = Pot::new(Participants::default());
    restored
        .replace_history(imported.history, imported.last_reset)
        .unwrap();
    assert_eq!(restored, pot);
    assert_eq!(restored.person_totals(), pot.person_totals());
}

#[test]
fn test_never_reset_pot_has_no_comment_line() {
    let mut pot = Pot::new(Participants::default());
    pot.record_bet(false, true, "", Money::from_cents(500))
        .unwrap();
    let csv = interchange::export_string(&pot).unwrap();
    assert!(csv.starts_with("timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment\r\n"));

    let imported = interchange::import(csv.as_bytes(), pot.participants()).unwrap();
    assert_eq!(imported.last_reset, None);
}

#[test]
fn test_edited_entries_survive_roundtrip() {
    let mut pot = evening();
    pot.edit_transaction(
        1,
        TransactionEdit::Bet {
            first_wrong: true,
            second_wrong: true,
            stake: Money::from_cents(125),
            comment: "nachgetragen".to_string(),
        },
    )
    .unwrap();

    let csv = interchange::export_string(&pot).unwrap();
    let imported = interchange::import(csv.as_bytes(), pot.participants()).unwrap();
    assert_eq!(imported.history, pot.history());
}

#[test]
fn test_row_with_foreign_participant_aborts_import() {
    let csv = "timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment\n\
               2025-06-01T18:30:00+02:00,BEER,-2.00,Bier bezahlt,Hans,,0.00,\n";
    assert!(matches!(
        interchange::import(csv.as_bytes(), &Participants::default()),
        Err(InterchangeError::Row { line: 2, .. })
    ));
}

#[test]
fn test_naive_timestamps_are_utc() {
    let csv = "timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment\n\
               2025-01-15T12:00:00,BET,5.00,Sevi verliert,,,0.00,\n";
    let imported = interchange::import(csv.as_bytes(), &Participants::default()).unwrap();
    let record = imported.history[0].to_record(&Participants::default());
    assert_eq!(record.timestamp, "2025-01-15T13:00:00+01:00");
}

#[test]
fn test_row_with_huge_delta_aborts_import() {
    let csv = "timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment\n\
               2025-06-01T18:30:00+02:00,BET,5.00,Sven verliert,,,0.00,\n\
               2025-06-01T18:31:00+02:00,BET,79228162514264337593543950335,Sven verliert,,,0.00,\n";
    assert!(matches!(
        interchange::import(csv.as_bytes(), &Participants::default()),
        Err(InterchangeError::Row { line: 3, .. })
    ));
}

#[test]
fn test_rows_summing_past_the_limit_leave_pot_untouched() {
    let csv = "timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment\n\
               2025-06-01T18:30:00+02:00,BET,9999999999999999.99,Sven verliert,,,0.00,\n\
               2025-06-01T18:31:00+02:00,BET,0.01,Sevi verliert,,,0.00,\n";
    let imported = interchange::import(csv.as_bytes(), &Participants::default()).unwrap();

    let mut pot = evening();
    let before = pot.clone();
    assert!(matches!(
        pot.replace_history(imported.history, imported.last_reset),
        Err(LedgerError::MalformedRecord(_))
    ));
    assert_eq!(pot, before);
}
