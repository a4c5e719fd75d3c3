use miz_core::model::document::{FileFormat, Translations};
use miz_core::parsers::{self, escape};
use miz_core::services::rebuild::rebuild;
use pretty_assertions::assert_eq;

const MISSION_DICTIONARY: &str = r#"dictionary = 
{
    ["DictKey_ActionRadioText_12"] = "Tbilisi tower, Enfield 1-1, request taxi.",
    ["DictKey_descriptionBlueTask_3"] = "1. Escort the tanker to \"ARCO\" track.\
2. Hold at angels 25.\
\
3. RTB to C:\\Kutaisi when bingo.",
    ["DictKey_descriptionRedTask_4"] = "",
    ["DictKey_descriptionText_1"] = "Weather: CAVOK\nWind 270@10",
    ["DictKey_sortie_5"] = "Operation Dawn",
} -- end of dictionary
"#;

const CAMPAIGN: &str = r#"campaign = 
{
    ["name"] = "Black Sea Rising",
    ["name_RU"] = "Восход над Черным морем",
    ["description"] = "Three weeks of escalating tension.\
Your squadron is the first to deploy.",
    ["description_DE"] = [[Drei Wochen eskalierender Spannungen.
Ihre Staffel wird als erste verlegt.]],
    ["stages"] = 
    {
        [1] = 
        {
            ["name"] = "Deployment",
            ["missions"] = 
            {
                [1] = 
                {
                    ["file"] = "BSR_01.miz",
                    ["rating"] = 
                    {
                        [100] = 1,
                    },
                },
            },
        },
    },
    ["startStage"] = 1,
    ["version"] = 4,
    ["picture"] = "bsr.png"
} -- end of campaign
"#;

#[test]
fn untouched_files_are_reproduced_exactly() {
    for (text, format) in [
        (MISSION_DICTIONARY, FileFormat::Dictionary),
        (CAMPAIGN, FileFormat::Campaign),
    ] {
        let doc = parsers::parse(text, format);
        assert_eq!(rebuild(&doc, &Translations::new()).text, text);

        let crlf = text.replace('\n', "\r\n");
        let doc = parsers::parse(&crlf, format);
        assert_eq!(rebuild(&doc, &Translations::new()).text, crlf);
    }
}

#[test]
fn every_entry_keeps_value_and_raw_lines_aligned() {
    for (text, format) in [
        (MISSION_DICTIONARY, FileFormat::Dictionary),
        (CAMPAIGN, FileFormat::Campaign),
    ] {
        let doc = parsers::parse(text, format);
        assert!(!doc.store.is_empty());
        for e in doc.store.iter() {
            assert_eq!(e.value_lines.len(), e.raw_file_lines.len(), "{}", e.key);
            assert_eq!(
                doc.source_lines[e.start_line_index..e.end_line_index()],
                e.raw_file_lines[..],
                "{}",
                e.key
            );
        }
    }
}

#[test]
fn decoded_values_match_what_the_translator_sees() {
    let doc = parsers::parse(MISSION_DICTIONARY, FileFormat::Dictionary);
    assert_eq!(
        doc.store.get("DictKey_descriptionBlueTask_3").unwrap().value_lines,
        vec![
            r#"1. Escort the tanker to "ARCO" track."#,
            "2. Hold at angels 25.",
            "",
            r"3. RTB to C:\Kutaisi when bingo.",
        ]
    );
    assert_eq!(
        doc.store.get("DictKey_descriptionText_1").unwrap().value_lines,
        vec![r"Weather: CAVOK\nWind 270@10"]
    );
    assert_eq!(
        doc.store.get("DictKey_descriptionRedTask_4").unwrap().value_lines,
        vec![""]
    );
}

#[test]
fn translated_values_read_back_identically() {
    let doc = parsers::parse(MISSION_DICTIONARY, FileFormat::Dictionary);

    let mut translations = Translations::new();
    for (i, e) in doc.store.iter().enumerate() {
        let lines: Vec<String> = (0..=i)
            .map(|n| format!(r#"Zeile {n} "zitiert" \ {}"#, e.key))
            .collect();
        translations.insert(e.key.clone(), lines);
    }

    let out = rebuild(&doc, &translations);
    let reparsed = parsers::parse(&out.text, FileFormat::Dictionary);

    assert_eq!(reparsed.store.len(), doc.store.len());
    for e in reparsed.store.iter() {
        assert_eq!(&e.value_lines, &translations[&e.key], "{}", e.key);
    }
    assert_eq!(
        reparsed.store.keys().collect::<Vec<_>>(),
        doc.store.keys().collect::<Vec<_>>()
    );
}

#[test]
fn campaign_translation_leaves_structure_alone() {
    let doc = parsers::parse(CAMPAIGN, FileFormat::Campaign);
    let mut translations = Translations::new();
    translations.insert(
        "description_DE".into(),
        vec!["Drei Wochen.".into(), "Zwei Zeilen.".into(), "Drei Zeilen.".into()],
    );
    translations.insert("name".into(), vec!["Schwarzmeer im Aufruhr".into()]);

    let out = rebuild(&doc, &translations);
    assert!(out.text.contains("            [\"name\"] = \"Deployment\","));
    assert!(out.text.contains("[\"file\"] = \"BSR_01.miz\","));
    assert!(out
        .text
        .contains("    [\"description_DE\"] = [[Drei Wochen.\nZwei Zeilen.\nDrei Zeilen.]],\n"));

    let reparsed = parsers::parse(&out.text, FileFormat::Campaign);
    assert_eq!(
        reparsed.store.get("name").unwrap().value_lines,
        vec!["Schwarzmeer im Aufruhr"]
    );
    assert_eq!(
        reparsed.store.get("file").unwrap().value_lines,
        vec!["BSR_01.miz"]
    );
}

#[test]
fn codec_inverts_file_fragments_from_real_values() {
    let doc = parsers::parse(MISSION_DICTIONARY, FileFormat::Dictionary);
    for e in doc.store.iter() {
        for line in &e.value_lines {
            assert_eq!(escape::decode(&escape::encode(line)), *line);
        }
    }
}
