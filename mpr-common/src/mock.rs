//! Offline dataset served when the upstream is unreachable and the mock
//! fallback is enabled

use crate::models::{
    LastOccurrence, OccurrenceInterview, Pageable, Person, PersonPage, Sex, Sort,
};

/// Registry-wide counters advertised by the mock envelope
pub const MOCK_TOTAL_ELEMENTS: i64 = 535;
pub const MOCK_TOTAL_PAGES: i64 = 54;

struct Row {
    id: i64,
    nome: &'static str,
    idade: i32,
    sexo: Sex,
    vivo: bool,
    foto: Option<&'static str>,
    desaparecimento: &'static str,
    localizacao: Option<&'static str>,
    local: &'static str,
    informacao: Option<&'static str>,
    vestimentas: &'static str,
    oco_id: i64,
}

const ROWS: &[Row] = &[
    Row {
        id: 2387,
        nome: "ASASD",
        idade: 0,
        sexo: Sex::Masculino,
        vivo: true,
        foto: Some("https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=300&h=300&fit=crop&crop=face"),
        desaparecimento: "2025-04-02T22:22:00",
        localizacao: None,
        local: "asdasd - Cuiabá/MT",
        informacao: None,
        vestimentas: "vestido branco",
        oco_id: 1527,
    },
    Row {
        id: 2366,
        nome: "JONATHAN GABRIEL ALVES VALIENTE",
        idade: 47,
        sexo: Sex::Masculino,
        vivo: true,
        foto: Some("https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=300&h=300&fit=crop&crop=face"),
        desaparecimento: "2025-04-02T11:11:00",
        localizacao: None,
        local: "centro - Várzea Grande/MT",
        informacao: None,
        vestimentas: "estava vestida.",
        oco_id: 1526,
    },
    Row {
        id: 2386,
        nome: "ALINA DA SOUZA",
        idade: 0,
        sexo: Sex::Feminino,
        vivo: true,
        foto: None,
        desaparecimento: "2025-04-01T15:00:00",
        localizacao: None,
        local: "terra nova - Cuiabá/MT",
        informacao: None,
        vestimentas: "sdada",
        oco_id: 1525,
    },
    Row {
        id: 2364,
        nome: "JOANA DA SILVA",
        idade: 40,
        sexo: Sex::Feminino,
        vivo: false,
        foto: Some("https://images.unsplash.com/photo-1494790108755-2616b52c97e1?w=300&h=300&fit=crop&crop=face"),
        desaparecimento: "2025-03-27T14:00:00",
        localizacao: Some("2025-04-10T10:00:00"),
        local: "CPAV - Cuiabá/MT",
        informacao: Some("asdas"),
        vestimentas: "SHORT PRETO E CAMISA BRANCA",
        oco_id: 1524,
    },
    Row {
        id: 2384,
        nome: "KAIO ALVES LACERDA",
        idade: 40,
        sexo: Sex::Masculino,
        vivo: true,
        foto: Some("https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=300&h=300&fit=crop&crop=face"),
        desaparecimento: "2025-03-26T15:30:00",
        localizacao: None,
        local: "PEDRA NOVENTA - Cuiabá/MT",
        informacao: None,
        vestimentas: "CALÇA BRANCA E CAMISETA AZUL DE MANGA LONGA",
        oco_id: 1522,
    },
    Row {
        id: 2385,
        nome: "HUGO DA SILVA",
        idade: 0,
        sexo: Sex::Masculino,
        vivo: true,
        foto: Some("https://images.unsplash.com/photo-1519085360753-af0119f7cbe7?w=300&h=300&fit=crop&crop=face"),
        desaparecimento: "2025-03-26T15:00:00",
        localizacao: None,
        local: "terra nova - Cuiabá/MT",
        informacao: None,
        vestimentas: "",
        oco_id: 1523,
    },
];

/// The mock records, newest disappearance first
pub fn people() -> Vec<Person> {
    ROWS.iter()
        .map(|r| Person {
            id: r.id,
            nome: r.nome.to_string(),
            idade: r.idade,
            sexo: r.sexo,
            vivo: r.vivo,
            url_foto: r.foto.map(str::to_string),
            ultima_ocorrencia: LastOccurrence {
                dt_desaparecimento: r.desaparecimento.to_string(),
                data_localizacao: r.localizacao.map(str::to_string),
                encontrado_vivo: false,
                local_desaparecimento_concat: r.local.to_string(),
                ocorrencia_entrev_desap_dto: Some(OccurrenceInterview {
                    informacao: r.informacao.map(str::to_string),
                    vestimentas_desaparecido: r.vestimentas.to_string(),
                }),
                lista_cartaz: None,
                oco_id: r.oco_id,
            },
        })
        .collect()
}

/// Page envelope with the advertised counters and the first page of records
pub fn page() -> PersonPage {
    let content = people();
    PersonPage {
        total_elements: MOCK_TOTAL_ELEMENTS,
        total_pages: MOCK_TOTAL_PAGES,
        pageable: Pageable {
            page_number: 0,
            page_size: 10,
            sort: Sort {
                unsorted: false,
                sorted: true,
                empty: false,
            },
            offset: 0,
            unpaged: false,
            paged: true,
        },
        number_of_elements: 10,
        first: true,
        last: false,
        size: 10,
        content,
    }
}

pub fn find(id: i64) -> Option<Person> {
    people().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_has_one_located_record() {
        let located: Vec<i64> = people()
            .iter()
            .filter(|p| p.ultima_ocorrencia.is_located())
            .map(|p| p.id)
            .collect();
        assert_eq!(located, vec![2364]);
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find(2386).map(|p| p.nome), Some("ALINA DA SOUZA".to_string()));
        assert!(find(1).is_none());
    }
}
