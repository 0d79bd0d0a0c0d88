// End-to-end segmentation scenarios over the embedded default dictionary.
//
// The expected word lists follow the dictionary shipped in core/data; the
// invariant tests (concatenation, offsets) hold for any dictionary.

use hanseg_core::{utils, Token, TokenizeMode, Tokenizer};

fn token(word: &str, start: usize, end: usize) -> Token {
    Token {
        word: word.to_string(),
        start,
        end,
    }
}

#[test]
fn accurate_mode_with_hmm() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("我来到北京清华大学", false, true),
        ["我", "来到", "北京", "清华大学"]
    );
}

#[test]
fn accurate_mode_without_hmm() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("我来到北京清华大学", false, false),
        ["我", "来到", "北京", "清华大学"]
    );
}

#[test]
fn full_mode_lists_overlapping_words() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("我来到北京清华大学", true, true),
        ["我", "来到", "北京", "清华", "清华大学", "华大", "大学"]
    );
}

#[test]
fn hmm_recovers_unseen_words() {
    let tok = Tokenizer::new();
    // 杭研 is not in the dictionary; the BMES decoder joins it.
    assert_eq!(
        tok.lcut("他来到了网易杭研大厦", false, true),
        ["他", "来到", "了", "网易", "杭研", "大厦"]
    );
    // without the decoder the run stays in single characters
    assert_eq!(
        tok.lcut("他来到了网易杭研大厦", false, false),
        ["他", "来到", "了", "网易", "杭", "研", "大厦"]
    );
}

#[test]
fn search_mode_emits_subwords_before_each_word() {
    let tok = Tokenizer::new();
    let words = tok.lcut_for_search("小明硕士毕业于中国科学院计算所", true);
    assert_eq!(
        words,
        [
            "小明",
            "硕士",
            "毕业",
            "于",
            "中国",
            "科学",
            "学院",
            "科学院",
            "中国科学院",
            "计算",
            "计算所"
        ]
    );
    for expected in ["中国科学院", "中国", "科学", "学院", "科学院"] {
        assert!(words.iter().any(|w| w == expected), "missing {expected}");
    }
}

#[test]
fn tokenize_default_offsets() {
    let tok = Tokenizer::new();
    let tokens: Vec<Token> = tok
        .tokenize("永和服装饰品有限公司", TokenizeMode::Default, true)
        .collect();
    assert_eq!(
        tokens,
        [
            token("永和", 0, 2),
            token("服装", 2, 4),
            token("饰品", 4, 6),
            token("有限公司", 6, 10),
        ]
    );
}

#[test]
fn tokenize_search_offsets() {
    let tok = Tokenizer::new();
    let tokens: Vec<Token> = tok
        .tokenize("小明硕士毕业于中国科学院计算所", TokenizeMode::Search, true)
        .collect();
    assert_eq!(
        tokens,
        [
            token("小明", 0, 2),
            token("硕士", 2, 4),
            token("毕业", 4, 6),
            token("于", 6, 7),
            token("中国", 7, 9),
            token("科学", 9, 11),
            token("学院", 10, 12),
            token("科学院", 9, 12),
            token("中国科学院", 7, 12),
            token("计算", 12, 14),
            token("计算所", 12, 15),
        ]
    );
}

#[test]
fn tokenize_offsets_count_code_points_and_abut() {
    let tok = Tokenizer::new();
    let sentence = "他来到了网易杭研大厦, hello world!";
    let tokens: Vec<Token> = tok.tokenize(sentence, TokenizeMode::Default, true).collect();
    assert_eq!(tokens[0].start, 0);
    for t in &tokens {
        assert_eq!(t.end - t.start, t.word.chars().count());
    }
    for pair in tokens.windows(2) {
        assert_eq!(pair[1].start, pair[0].end);
    }
    assert_eq!(
        tokens.last().map(|t| t.end),
        Some(sentence.chars().count())
    );
}

#[test]
fn accurate_modes_preserve_concatenation() {
    let tok = Tokenizer::new();
    let sentence = "我来到北京, hello world!\r\n他来到了网易杭研大厦。3.14%";
    for hmm in [false, true] {
        let joined: String = tok.cut(sentence, false, hmm).collect();
        assert_eq!(joined, sentence);
    }
}

#[test]
fn added_word_cuts_out() {
    let mut tok = Tokenizer::new();
    tok.add_word("量子计算机", None, None);
    let words = tok.lcut("量子计算机很好", false, true);
    assert!(words.contains(&"量子计算机".to_string()), "{words:?}");
}

#[test]
fn zero_freq_word_force_splits_hmm_output() {
    let mut tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("他来到了网易杭研大厦", false, true),
        ["他", "来到", "了", "网易", "杭研", "大厦"]
    );
    // deleting the (OOV) word pins it apart even though the decoder would
    // still recover it
    tok.del_word("杭研");
    assert_eq!(
        tok.lcut("他来到了网易杭研大厦", false, true),
        ["他", "来到", "了", "网易", "杭", "研", "大厦"]
    );
}

#[test]
fn ascii_runs_are_glued_in_han_blocks() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("abc网球拍卖会def", false, false),
        ["abc", "网球", "拍卖会", "def"]
    );
    assert_eq!(
        tok.lcut("abc网球拍卖会def", false, true),
        ["abc", "网球", "拍卖会", "def"]
    );
}

#[test]
fn numbers_pass_through_whole_with_hmm() {
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut("圆周率是3.14", false, true),
        ["圆", "周", "率", "是", "3.14"]
    );
}

#[test]
fn gbk_bytes_decode_then_cut() {
    // "他来到了网易杭研大厦" in GBK
    let bytes: &[u8] = &[
        0xcb, 0xfb, 0xc0, 0xb4, 0xb5, 0xbd, 0xc1, 0xcb, 0xcd, 0xf8, 0xd2, 0xd7, 0xba, 0xbc,
        0xd1, 0xd0, 0xb4, 0xf3, 0xcf, 0xc3,
    ];
    let text = utils::decode(bytes);
    let tok = Tokenizer::new();
    assert_eq!(
        tok.lcut(&text, false, true),
        ["他", "来到", "了", "网易", "杭研", "大厦"]
    );
}

#[test]
fn full_mode_drops_skip_characters() {
    let tok = Tokenizer::new();
    // punctuation is dropped in full mode, alnum runs kept whole
    assert_eq!(tok.lcut("abc, def!", true, true), ["abc", "def"]);
}
