// POS tagging scenarios: dictionary tags for known words, the joint
// (BMES, POS) decoder for out-of-vocabulary runs, character classes for
// everything else.

use hanseg_core::{Tokenizer, WordTag};

fn pair(word: &str, tag: &str) -> WordTag {
    WordTag::new(word, tag)
}

#[test]
fn known_words_take_dictionary_tags() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.pos_lcut("我爱北京天安门", true),
        [
            pair("我", "r"),
            pair("爱", "v"),
            pair("北京", "ns"),
            pair("天安门", "ns"),
        ]
    );
}

#[test]
fn joint_decoder_recovers_oov_with_pos() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.pos_lcut("他来到了网易杭研大厦", true),
        [
            pair("他", "r"),
            pair("来到", "v"),
            pair("了", "ul"),
            pair("网易", "nz"),
            pair("杭研", "ns"),
            pair("大厦", "n"),
        ]
    );
}

#[test]
fn without_hmm_oov_chars_tag_x() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.pos_lcut("他来到了网易杭研大厦", false),
        [
            pair("他", "r"),
            pair("来到", "v"),
            pair("了", "ul"),
            pair("网易", "nz"),
            pair("杭", "x"),
            pair("研", "x"),
            pair("大厦", "n"),
        ]
    );
}

#[test]
fn non_han_blocks_tag_by_character_class() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.pos_lcut("我买了3个苹果, very好", true),
        [
            pair("我", "r"),
            pair("买", "v"),
            pair("了", "ul"),
            pair("3", "m"),
            pair("个", "q"),
            pair("苹果", "n"),
            pair(",", "x"),
            pair(" ", "x"),
            pair("very", "eng"),
            pair("好", "a"),
        ]
    );
}

#[test]
fn ascii_runs_tag_eng_without_hmm() {
    let tok = Tokenizer::new();
    let pairs = tok.pos_lcut("iPhone是苹果的", false);
    assert_eq!(
        pairs,
        [
            pair("iPhone", "eng"),
            pair("是", "v"),
            pair("苹果", "n"),
            pair("的", "uj"),
        ]
    );
}

#[test]
fn user_added_tag_overrides_dictionary() {
    let mut tok = Tokenizer::new();
    assert_eq!(tok.pos_lcut("网易", true), [pair("网易", "nz")]);
    tok.add_word("网易", Some(1169), Some("org"));
    assert_eq!(tok.pos_lcut("网易", true), [pair("网易", "org")]);
}

#[test]
fn tagging_preserves_concatenation() {
    let tok = Tokenizer::new();
    let sentence = "我爱北京天安门, very好。\r\n他来到了网易杭研大厦";
    let joined: String = tok
        .pos_cut(sentence, true)
        .map(|p| p.word)
        .collect();
    assert_eq!(joined, sentence);
}

#[test]
fn word_tag_display() {
    let tok = Tokenizer::new();
    let rendered: Vec<String> = tok
        .pos_cut("我爱北京天安门", true)
        .map(|p| p.to_string())
        .collect();
    assert_eq!(rendered, ["我/r", "爱/v", "北京/ns", "天安门/ns"]);
}
