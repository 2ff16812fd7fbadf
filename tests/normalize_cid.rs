use grad_check::{
    config::Normalize,
    normalize::{count_cid_escapes, normalize_cid, normalize_page},
};

fn table() -> std::collections::BTreeMap<String, char> {
    Normalize::default().cid_map
}

#[test]
fn repairs_dotted_letters() {
    let t = table();
    assert_eq!(normalize_cid("B(cid:248)LG(cid:248)SAYAR", &t), "BİLGİSAYAR");
    assert_eq!(normalize_cid("Yaz(cid:213)l(cid:213)m", &t), "Yazılım");
}

#[test]
fn unknown_codes_are_dropped() {
    let t = table();
    assert_eq!(normalize_cid("Fi(cid:999)zik", &t), "Fizik");
    assert_eq!(normalize_cid("(cid:1)(cid:2)", &t), "");
}

#[test]
fn plain_text_passes_through() {
    let t = table();
    let s = "BM101 Programlama 4.0 6.0 AA (cid) cid:248";
    assert_eq!(normalize_cid(s, &t), s);
}

#[test]
fn idempotent_even_when_removal_splices_an_escape() {
    let t = table();
    let once = normalize_cid("((cid:7)cid:248)", &t);
    assert_eq!(once, "İ");
    assert_eq!(normalize_cid(&once, &t), once);

    let s = "Ders (cid:248)çerik (cid:12) ve Yaz(cid:213)l(cid:213)m";
    let once = normalize_cid(s, &t);
    assert_eq!(normalize_cid(&once, &t), once);
}

#[test]
fn page_hygiene() {
    let cfg = Normalize::default();
    let page = normalize_page(&cfg, "a \r\nb(cid:248)  \r\nc(cid:500) ");
    assert_eq!(page, "a\nbİ\nc");
    assert_eq!(normalize_page(&cfg, &page), page);
}

#[test]
fn page_hygiene_folds_compatibility_forms() {
    let cfg = Normalize::default();
    assert_eq!(normalize_page(&cfg, "ﬁzik"), "fizik");
}

#[test]
fn counts_escapes() {
    assert_eq!(count_cid_escapes("(cid:248)a(cid:1)"), 2);
    assert_eq!(count_cid_escapes("none"), 0);
}
