mod common;
use common::Sandbox;
use predicates::prelude::*;

const SHARE_DIALOG: &str = r#"
# heading rendered first, then the share dialog opens
{"op":"insert","id":"title","tag":"h1","attrs":{"class":"awsui_h1-variant_xyz"},"text":"Prod budget"}
{"op":"insert","id":"modal","tag":"div","attrs":{"class":"modal"}}
{"op":"insert","parent":"modal","id":"wrap","tag":"div","attrs":{"class":"save-share-clipboard-wrapper"}}
{"op":"insert","parent":"wrap","id":"link","tag":"input","attrs":{"type":"text","readonly":""},"value":"https://calculator.aws/#/estimate?id=prod"}
{"op":"insert","parent":"wrap","id":"copy","tag":"button","attrs":{"class":"clipboard-button"}}
{"op":"insert","parent":"copy","id":"icon","tag":"span"}
{"op":"click","target":"icon"}
{"op":"click","target":"copy"}
"#;

#[test]
fn test_watch_saves_clicked_link_once() {
    let sb = Sandbox::new();
    sb.init();
    let script = sb.write("dialog.jsonl", SHARE_DIALOG);

    sb.lv()
        .args(["watch", "--script", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate Saved!"))
        .stdout(predicate::str::contains("Link Already Saved"))
        .stdout(predicate::str::contains("1 control(s) attached, 2 click(s), 1 saved"));

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prod budget"))
        .stdout(predicate::str::contains("https://calculator.aws/#/estimate?id=prod"));

    // every capture line in the internal log names the link, duplicates included
    sb.lv()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("capture_duplicate"))
        .stdout(predicate::str::contains("(https://calculator.aws/#/estimate?id=p").count(2))
        .stdout(predicate::str::contains("dialog.jsonl").not());
}

#[test]
fn test_watch_reopened_dialog_is_a_new_control() {
    let sb = Sandbox::new();
    sb.init();
    let script = sb.write(
        "reopen.jsonl",
        r#"{"op":"insert","id":"wrap","tag":"div","attrs":{"class":"save-share-clipboard-wrapper"}}
{"op":"insert","parent":"wrap","id":"link","tag":"input","attrs":{"type":"text","readonly":""},"value":"https://calculator.aws/#/estimate?id=1"}
{"op":"insert","parent":"wrap","id":"copy","tag":"button","attrs":{"class":"clipboard-button"}}
{"op":"click","target":"copy"}
{"op":"remove","target":"wrap"}
{"op":"insert","id":"wrap2","tag":"div","attrs":{"class":"save-share-clipboard-wrapper"}}
{"op":"insert","parent":"wrap2","id":"link2","tag":"input","attrs":{"type":"text","readonly":""},"value":"https://calculator.aws/#/estimate?id=2"}
{"op":"insert","parent":"wrap2","id":"copy2","tag":"button","attrs":{"class":"clipboard-button"}}
{"op":"click","target":"copy2"}
"#,
    );

    sb.lv()
        .args(["watch", "--script", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 control(s) attached, 2 click(s), 2 saved"));

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Untitled Estimate").count(2));
}

#[test]
fn test_watch_empty_field_is_silent() {
    let sb = Sandbox::new();
    sb.init();
    let script = sb.write(
        "empty.jsonl",
        r#"{"op":"insert","id":"wrap","tag":"div","attrs":{"class":"save-share-clipboard-wrapper"}}
{"op":"insert","parent":"wrap","id":"link","tag":"input","attrs":{"type":"text","readonly":""}}
{"op":"insert","parent":"wrap","id":"copy","tag":"button","attrs":{"class":"clipboard-button"}}
{"op":"click","target":"copy"}
"#,
    );

    sb.lv()
        .args(["watch", "--script", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved").not())
        .stdout(predicate::str::contains("0 saved"));
}

#[test]
fn test_watch_bad_script_line() {
    let sb = Sandbox::new();
    sb.init();
    let script = sb.write(
        "bad.jsonl",
        "{\"op\":\"insert\",\"id\":\"a\",\"tag\":\"div\"}\n{\"op\":\"teleport\"}\n",
    );

    sb.lv()
        .args(["watch", "--script", &script])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Page script error at line 2"));
}
