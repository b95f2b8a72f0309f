use bulkmsg_core::{
    format_message, is_checked, normalize_phone, substitute, Cell, FieldMap, RecipientRow,
    TRUTHY_FLAGS,
};
use proptest::prelude::*;

fn sample_row() -> (RecipientRow, FieldMap) {
    let cells = vec![
        ("이름".to_string(), Cell::text("{{홍길동}}")),
        ("휴대폰번호".to_string(), Cell::text("010-1234-5678")),
        ("주문금액".to_string(), Cell::text("50000")),
    ];
    let columns: Vec<String> = cells.iter().map(|(name, _)| name.clone()).collect();
    (RecipientRow::new(1, cells), FieldMap::resolve(&columns))
}

proptest! {
    #[test]
    fn formatting_twice_changes_nothing(text in "[a-z0-9 :/\\n\\r\u{a0}가-힣]{0,80}") {
        let once = format_message(&text);
        prop_assert_eq!(format_message(&once), once);
    }

    #[test]
    fn formatting_arbitrary_text_is_idempotent(text in any::<String>()) {
        let once = format_message(&text);
        prop_assert_eq!(format_message(&once), once);
    }

    #[test]
    fn country_code_becomes_trunk_prefix(rest in "[0-9]{8,12}") {
        let normalized = normalize_phone(&format!("82{rest}")).unwrap();
        prop_assert_eq!(normalized, format!("0{rest}"));
    }

    #[test]
    fn short_numbers_are_rejected(raw in "[0-9]{0,9}", noise in "[ ()+-]{0,4}") {
        let input = format!("{noise}{raw}");
        prop_assert!(normalize_phone(&input).is_err(), "accepted {:?}", input);
    }

    #[test]
    fn substitution_never_leaves_double_braces(template in "[{}이름주문금액x ]{0,40}") {
        let (row, fields) = sample_row();
        let text = substitute(&template, &row, &fields);
        prop_assert!(!text.contains("{{"), "{}", text);
        prop_assert!(!text.contains("}}"), "{}", text);
    }

    #[test]
    fn truthy_flags_select_in_any_case(index in 0..TRUTHY_FLAGS.len(), pad in " {0,2}") {
        let flag = format!("{pad}{}{pad}", TRUTHY_FLAGS[index].to_lowercase());
        prop_assert!(is_checked(Some(&Cell::text(flag))));
    }
}
