//! Built-in outgoing-letter templates.
//!
//! Body markup is line based: `= ` centers a line, `> ` right-aligns it,
//! `# ` makes a heading, `- ` a list item, `---` a rule and `[img:...]` an
//! image. Inline `**bold**` and `*italic*` work inside any text line.

use common::model::field::{FieldKind, FieldSpec};
use common::model::template::{MetadataMapping, TemplateDefinition, TokenSyntax};

const KOP: &str = "\
= **KOMISI PEMILIHAN UMUM KOTA MANADO**
= Jl. Balai Kota No. 1, Tikala, Manado
---";

const UNDANGAN_BODY: &str = "\
{kop}

Nomor: {{nomor_surat}}
Lampiran: {{lampiran}}
Perihal: **{{perihal}}**
> Manado, {{tanggal_surat}}

Kepada Yth.
{{kepada}}
di Tempat

Dengan hormat, bersama ini kami mengundang Bapak/Ibu untuk menghadiri rapat yang akan dilaksanakan pada:

Hari/Tanggal: {{hari_tanggal}}
Waktu: {{waktu}}
Tempat: {{tempat}}

Dengan agenda sebagai berikut:
{{agenda}}

Demikian undangan ini kami sampaikan. Atas perhatian dan kehadiran Bapak/Ibu diucapkan terima kasih.

> Hormat kami,
> [img:{{tanda_tangan}}]
> **{{penandatangan}}**
> NIP. {{nip}}";

const TUGAS_BODY: &str = "\
{kop}

= # SURAT TUGAS
= Nomor: {{nomor_surat}}

Yang bertanda tangan di bawah ini menugaskan kepada:

Nama: {{nama_pegawai}}
NIP: {{nip_pegawai}}
Jabatan: {{jabatan}}

Untuk *{{perihal}}*, dengan rincian sebagai berikut:
{{keperluan}}

Tempat Tujuan: {{tempat_tujuan}}
Hari/Tanggal: {{hari_tanggal}}

Demikian surat tugas ini dibuat untuk dilaksanakan dengan penuh tanggung jawab.

> Manado, {{tanggal_surat}}
> [img:{{tanda_tangan}}]
> **{{penandatangan}}**";

// Authored with bracket tokens; migrated to mustache by the catalog.
const DINAS_BODY: &str = "\
{kop}

Nomor: [Nomor Surat]
Lampiran: [Lampiran]
Perihal: **[Perihal]**
> Manado, [Tanggal Surat]

Kepada Yth.
[Kepada]
di Tempat

[Isi Surat]

Tembusan:
[Tembusan]

> [img:[Tanda Tangan]]
> **[Penandatangan]**";

fn body(raw: &str) -> String {
    raw.replace("{kop}", KOP)
}

fn signature() -> FieldSpec {
    FieldSpec::new("tanda_tangan", "Tanda Tangan", FieldKind::File).accept("image/*")
}

fn divisi() -> FieldSpec {
    FieldSpec::new("divisi", "Divisi", FieldKind::Text).required()
}

pub(crate) fn templates() -> Vec<TemplateDefinition> {
    vec![
        TemplateDefinition {
            id: "surat_undangan".to_string(),
            name: "Surat Undangan Rapat".to_string(),
            category: "Surat Keluar".to_string(),
            description: "Template untuk surat undangan rapat".to_string(),
            created_date: "2024-03-20".to_string(),
            token_syntax: TokenSyntax::Mustache,
            field_specs: vec![
                FieldSpec::new("nomor_surat", "Nomor Surat", FieldKind::Text).required(),
                FieldSpec::new("lampiran", "Lampiran", FieldKind::Text).with_fallback("-"),
                FieldSpec::new("perihal", "Perihal", FieldKind::Text).required(),
                FieldSpec::new("tanggal_surat", "Tanggal Surat", FieldKind::Date).required(),
                FieldSpec::new("kepada", "Kepada", FieldKind::Text).required(),
                FieldSpec::new("hari_tanggal", "Hari/Tanggal", FieldKind::Date).required(),
                FieldSpec::new("waktu", "Waktu", FieldKind::Text).required(),
                FieldSpec::new("tempat", "Tempat", FieldKind::Text).required(),
                FieldSpec::new("agenda", "Agenda", FieldKind::RepeatingText).required(),
                FieldSpec::new("penandatangan", "Penandatangan", FieldKind::Text).required(),
                FieldSpec::new("nip", "NIP", FieldKind::Text),
                signature(),
                divisi(),
            ],
            body: body(UNDANGAN_BODY),
            metadata: MetadataMapping::conventional("kepada", "agenda"),
        },
        TemplateDefinition {
            id: "surat_tugas".to_string(),
            name: "Surat Tugas".to_string(),
            category: "Surat Keluar".to_string(),
            description: "Template untuk surat penugasan".to_string(),
            created_date: "2024-03-19".to_string(),
            token_syntax: TokenSyntax::Mustache,
            field_specs: vec![
                FieldSpec::new("nomor_surat", "Nomor Surat", FieldKind::Text).required(),
                FieldSpec::new("tanggal_surat", "Tanggal Surat", FieldKind::Date).required(),
                FieldSpec::new("perihal", "Perihal", FieldKind::Text).required(),
                FieldSpec::new("nama_pegawai", "Nama Pegawai", FieldKind::Text).required(),
                FieldSpec::new("nip_pegawai", "NIP Pegawai", FieldKind::Text),
                FieldSpec::new("jabatan", "Jabatan", FieldKind::Text).required(),
                FieldSpec::new("keperluan", "Keperluan", FieldKind::Textarea).required(),
                FieldSpec::new("tempat_tujuan", "Tempat Tujuan", FieldKind::Text).required(),
                FieldSpec::new("hari_tanggal", "Hari/Tanggal", FieldKind::Date).required(),
                FieldSpec::new("penandatangan", "Penandatangan", FieldKind::Text).required(),
                signature().required(),
                divisi(),
            ],
            body: body(TUGAS_BODY),
            metadata: MetadataMapping::conventional("nama_pegawai", "keperluan"),
        },
        TemplateDefinition {
            id: "surat_dinas".to_string(),
            name: "Surat Dinas".to_string(),
            category: "Surat Keluar".to_string(),
            description: "Template untuk surat dinas umum".to_string(),
            created_date: "2024-03-18".to_string(),
            token_syntax: TokenSyntax::Bracket,
            field_specs: vec![
                FieldSpec::new("nomor_surat", "Nomor Surat", FieldKind::Text).required(),
                FieldSpec::new("lampiran", "Lampiran", FieldKind::Text),
                FieldSpec::new("perihal", "Perihal", FieldKind::Text).required(),
                FieldSpec::new("tanggal_surat", "Tanggal Surat", FieldKind::Date).required(),
                FieldSpec::new("kepada", "Kepada", FieldKind::Text).required(),
                FieldSpec::new("isi", "Isi Surat", FieldKind::Textarea).required(),
                FieldSpec::new("tembusan", "Tembusan", FieldKind::RepeatingText),
                FieldSpec::new("penandatangan", "Penandatangan", FieldKind::Text).required(),
                signature(),
                divisi(),
            ],
            body: body(DINAS_BODY),
            metadata: MetadataMapping::conventional("kepada", "isi"),
        },
    ]
}
