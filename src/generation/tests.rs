use super::{Generation, GenerationResponse};

#[test]
fn parses_a_generations_list() {
    let response: GenerationResponse =
        serde_json::from_str(r#"{"generations": [{"text": "first"}, {"text": "second"}]}"#)
            .expect("should parse a generations list");

    assert_eq!(
        response,
        GenerationResponse::Generations {
            generations: vec![
                Generation {
                    text: "first".to_string()
                },
                Generation {
                    text: "second".to_string()
                },
            ],
        }
    );
    assert_eq!(response.into_text(), "first");
}

#[test]
fn parses_a_direct_text_field() {
    let response: GenerationResponse = serde_json::from_str(r#"{"text": "plain answer"}"#)
        .expect("should parse a direct text field");

    assert_eq!(response.into_text(), "plain answer");
}

#[test]
fn richer_shape_wins_when_both_match() {
    let response: GenerationResponse = serde_json::from_str(
        r#"{"generations": [{"text": "structured"}], "text": "flat"}"#,
    )
    .expect("should parse when both shapes are present");

    assert_eq!(response.into_text(), "structured");
}

#[test]
fn unknown_shapes_fall_back_to_the_raw_value() {
    let response: GenerationResponse =
        serde_json::from_str(r#"{"output": 42}"#).expect("should accept any JSON value");

    assert!(matches!(response, GenerationResponse::Other(_)));
    assert_eq!(response.into_text(), r#"{"output":42}"#);
}

#[test]
fn empty_generations_list_yields_an_empty_string() {
    let response: GenerationResponse =
        serde_json::from_str(r#"{"generations": []}"#).expect("should parse an empty list");

    assert_eq!(response.into_text(), "");
}
