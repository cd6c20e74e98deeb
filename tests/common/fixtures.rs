/// Two-paragraph story used across integration tests.
pub const STORY_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。它长得可凶啦！\n头上长着长长的角，嘴里龇着尖尖的牙，发起怒来，就会张开血盆大口，哇哇大叫。";
pub const STORY_ANNOTATION: &str = "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。 tā cháng dé kě xiōng lā ！ \n tóu shàng cháng zhuó cháng cháng de jiǎo ， zuǐ lǐ zī zhuó jiān jiān de yá ， fā qǐ nù lái ， jiù huì zhāng kāi xiě pén dà kǒu ， wā wā dà jiào 。";

/// Caller tokens in the story, the break included.
pub const STORY_TOKENS: usize = 67;
pub const STORY_BREAKS: usize = 1;

/// `times` copies of the story, one paragraph pair per copy.
pub fn long_story(times: usize) -> (String, String) {
    (
        vec![STORY_BASE; times].join("\n"),
        vec![STORY_ANNOTATION; times].join(" \n "),
    )
}
